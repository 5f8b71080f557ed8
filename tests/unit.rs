//! Unit tests for the pure pieces: date table, coordinate model, mapping
//! fan-out, slot catalog and the session state machine.
mod common;

use chrono::NaiveDate;

use sitedocs::mapping::atp::{sn_module_cells, ProjectField, SN_MODULE_MAX};
use sitedocs::mapping::bast;
use sitedocs::mapping::coords::{placement, Anchor, CellOffset, CoordinateSpec, ImageAnchor};
use sitedocs::photos;
use sitedocs::render::date::{format_date_field, short_date};
use sitedocs::templates::{Counterparty, Region, TemplateRef};
use sitedocs::wizard::gate;
use sitedocs::{DocKind, PhotoAsset, PhotoFormat, PhotoSlot, WizardSession, WizardStep};

#[test]
fn short_date_uses_fixed_month_table() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    assert_eq!(short_date(date), "06-Aug-26");

    let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    assert_eq!(short_date(date), "31-Dec-25");
}

#[test]
fn date_field_passes_unparseable_input_through() {
    assert_eq!(format_date_field("2026-03-15"), "15-Mar-26");
    assert_eq!(format_date_field("next week"), "next week");
    assert_eq!(format_date_field(""), "");
}

#[test]
fn anchor_fraction_splits_into_cell_and_offset() {
    let offset = CellOffset::from_anchor(Anchor::new(2.1, 92.1));
    assert_eq!(offset.col, 2);
    assert_eq!(offset.row, 92);
    // 0.1 of a 64 px cell and of a 20 px row, in EMU.
    assert_eq!(offset.col_off_emu, 60960);
    assert_eq!(offset.row_off_emu, 19050);
}

#[test]
fn region_fill_produces_two_cell_anchor() {
    let asset = PhotoAsset {
        slot: PhotoSlot::BatteryBankA,
        bytes: vec![1, 2, 3],
        preview: String::new(),
        format: PhotoFormat::Jpeg,
    };
    let spec = CoordinateSpec::BoundingRegion {
        top_left: Anchor::new(2.1, 92.1),
        bottom_right: Anchor::new(5.9, 96.9),
    };

    match placement(spec, &asset).anchor {
        ImageAnchor::TwoCell { from, to } => {
            assert_eq!((from.col, from.row), (2, 92));
            assert_eq!((to.col, to.row), (5, 96));
            assert!(to.col_off_emu > from.col_off_emu);
        }
        other => panic!("expected two-cell anchor, got {other:?}"),
    }
}

#[test]
fn fixed_extent_ignores_source_resolution() {
    let asset = PhotoAsset {
        slot: PhotoSlot::RectifierSerial,
        bytes: vec![1, 2, 3],
        preview: String::new(),
        format: PhotoFormat::Png,
    };
    let spec = CoordinateSpec::FixedExtent {
        anchor: Anchor::new(1.2, 80.2),
        width_px: 220,
        height_px: 140,
    };

    match placement(spec, &asset).anchor {
        ImageAnchor::OneCell {
            from,
            ext_cx_emu,
            ext_cy_emu,
        } => {
            assert_eq!((from.col, from.row), (1, 80));
            assert_eq!(ext_cx_emu, 220 * 9525);
            assert_eq!(ext_cy_emu, 140 * 9525);
        }
        other => panic!("expected one-cell anchor, got {other:?}"),
    }
}

#[test]
fn serial_fanout_maps_tokens_to_successive_rows() {
    let cells = sn_module_cells("AB12 CD34 EF56");
    assert_eq!(
        cells,
        vec![
            ("C18".to_string(), "AB12".to_string()),
            ("C19".to_string(), "CD34".to_string()),
            ("C20".to_string(), "EF56".to_string()),
        ]
    );
}

#[test]
fn serial_fanout_caps_at_twelve_tokens() {
    let tokens: Vec<String> = (0..13).map(|i| format!("SN{i:02}")).collect();
    let cells = sn_module_cells(&tokens.join(" "));
    assert_eq!(cells.len(), SN_MODULE_MAX);
    assert_eq!(cells.last().unwrap().0, "C29");
    assert_eq!(cells.last().unwrap().1, "SN11");
}

#[test]
fn catalog_is_complete_and_unique() {
    photos::validate_catalog().expect("catalog validates");
    assert_eq!(photos::PHOTO_CATALOG.len(), 16);

    // The battery frame transcribed from the form layout.
    let coord = photos::coord_for(PhotoSlot::BatteryBankA).unwrap();
    assert_eq!(
        coord,
        CoordinateSpec::BoundingRegion {
            top_left: Anchor::new(2.1, 92.1),
            bottom_right: Anchor::new(5.9, 96.9),
        }
    );
}

#[test]
fn bast_template_ids_cover_counterparty_by_region() {
    let mut ids = std::collections::BTreeSet::new();
    for counterparty in Counterparty::ALL {
        for region in Region::ALL {
            ids.insert(TemplateRef::Bast(counterparty, region).id());
        }
    }
    assert_eq!(ids.len(), 15);
    assert!(ids.contains("kin_jabo1"));
    assert!(ids.contains("iforte_jatim"));
}

#[test]
fn gate_is_pure_and_blocks_until_step_is_complete() {
    let mut session = WizardSession::new(DocKind::Atp);
    assert!(!gate::step_complete(&session, WizardStep::SelectSite));
    assert!(!session.next());
    assert_eq!(session.current_step(), WizardStep::SelectSite);

    session.select_record(common::make_record("JKT001"));
    // Same state, same verdict.
    assert!(gate::step_complete(&session, WizardStep::SelectSite));
    assert!(gate::step_complete(&session, WizardStep::SelectSite));
    assert!(session.next());
    assert_eq!(session.current_step(), WizardStep::ProjectDetails);
}

#[test]
fn record_selection_prefills_project_fields() {
    let mut session = WizardSession::new(DocKind::Atp);
    session.select_record(common::make_record("JKT001"));

    assert_eq!(session.project.site_id, "JKT001");
    assert_eq!(session.project.install_date, "2026-03-15");
    // Not derivable from the record; stays empty for the user.
    assert_eq!(session.project.project_name, "");

    // Prefill is overwritable.
    session.set_project_field(ProjectField::SiteName, "Renamed Site".into());
    assert_eq!(session.project.site_name, "Renamed Site");
}

#[test]
fn wizard_cannot_skip_steps_and_previous_is_bounded() {
    let mut session = common::complete_atp_session(common::make_record("JKT001"));
    assert!(!session.previous());

    let mut steps = vec![session.current_step()];
    while session.next() {
        steps.push(session.current_step());
    }
    assert_eq!(
        steps,
        vec![
            WizardStep::SelectSite,
            WizardStep::ProjectDetails,
            WizardStep::Measurements,
            WizardStep::Photos,
            WizardStep::Review,
        ]
    );
    // Review is terminal for `next`.
    assert!(!session.next());
    assert!(session.previous());
    assert_eq!(session.current_step(), WizardStep::Photos);
}

#[test]
fn reset_restores_the_initial_value() {
    let mut session = common::complete_atp_session(common::make_record("JKT001"));
    while session.next() {}
    session.reset();

    assert_eq!(session.current_step(), WizardStep::SelectSite);
    assert!(session.record.is_none());
    assert!(session.photos.is_empty());
    assert_eq!(session.project.site_id, "");
    assert!(!session.generated);
}

#[test]
fn bast_gate_requires_selectors_and_three_fields() {
    let mut session = WizardSession::new(DocKind::Bast);
    session.select_record(common::make_record("JKT001"));
    assert!(!gate::step_complete(&session, WizardStep::SelectSite));

    session.set_counterparty(Counterparty::Kin);
    assert!(gate::step_complete(&session, WizardStep::SelectSite));

    // Site id, name and install date are prefilled; only the region is
    // still missing.
    assert!(!gate::step_complete(&session, WizardStep::ProjectDetails));
    session.set_region(Region::Jabo1);
    assert!(gate::step_complete(&session, WizardStep::ProjectDetails));
    assert!(gate::ready_to_generate(&session));
}

#[test]
fn domain_models_serialize_camel_case() {
    let record = common::make_record("JKT001");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["siteId"], "JKT001");
    assert_eq!(json["atpStatus"], "pending");
    assert_eq!(json["installDate"], "2026-03-15");

    let session = WizardSession::new(DocKind::Atp);
    let json = serde_json::to_value(&session).unwrap();
    assert_eq!(json["kind"], "atp");
    assert_eq!(json["generated"], false);
}

#[test]
fn bast_substitutions_use_empty_strings_for_missing_values() {
    let mut session = WizardSession::new(DocKind::Bast);
    session.select_record(common::make_record("JKT001"));
    session.set_counterparty(Counterparty::Tbg);

    let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    let pairs = bast::substitutions(&session, today);
    let lookup = |key: &str| {
        pairs
            .iter()
            .find(|(placeholder, _)| placeholder == key)
            .map(|(_, value)| value.clone())
            .unwrap()
    };

    assert_eq!(lookup("site_id"), "JKT001");
    assert_eq!(lookup("install_date"), "15-Mar-26");
    assert_eq!(lookup("counterparty"), "Tower Bersama Group");
    // Region not chosen yet: empty string, not a null marker.
    assert_eq!(lookup("region"), "");
    assert_eq!(lookup("project_name"), "");
    assert_eq!(lookup("handover_date"), "06-Aug-26");
}
