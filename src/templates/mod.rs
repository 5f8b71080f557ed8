use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// BAST counterparty selector. The selector strings are template-identifier
/// fragments, fixed by the template naming convention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Counterparty {
    Kin,
    Tbg,
    Mitratel,
    Protelindo,
    Iforte,
}

impl Counterparty {
    pub const ALL: [Counterparty; 5] = [
        Counterparty::Kin,
        Counterparty::Tbg,
        Counterparty::Mitratel,
        Counterparty::Protelindo,
        Counterparty::Iforte,
    ];

    pub fn selector(&self) -> &'static str {
        match self {
            Counterparty::Kin => "kin",
            Counterparty::Tbg => "tbg",
            Counterparty::Mitratel => "mtel",
            Counterparty::Protelindo => "pro",
            Counterparty::Iforte => "iforte",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Counterparty::Kin => "KIN",
            Counterparty::Tbg => "Tower Bersama Group",
            Counterparty::Mitratel => "Mitratel",
            Counterparty::Protelindo => "Protelindo",
            Counterparty::Iforte => "iForte",
        }
    }
}

/// BAST region selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    Jabo1,
    Jabo2,
    Jatim,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Jabo1, Region::Jabo2, Region::Jatim];

    pub fn selector(&self) -> &'static str {
        match self {
            Region::Jabo1 => "jabo1",
            Region::Jabo2 => "jabo2",
            Region::Jatim => "jatim",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Jabo1 => "Jabodetabek 1",
            Region::Jabo2 => "Jabodetabek 2",
            Region::Jatim => "Jawa Timur",
        }
    }
}

/// A resolvable template. ATP is a single fixed workbook; BAST resolves from
/// counterparty x region (15 possible identifiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRef {
    Atp,
    Bast(Counterparty, Region),
}

impl TemplateRef {
    /// The identifier shown to users in not-found errors.
    pub fn id(&self) -> String {
        match self {
            TemplateRef::Atp => "atp".to_string(),
            TemplateRef::Bast(cp, region) => {
                format!("{}_{}", cp.selector(), region.selector())
            }
        }
    }

    /// Blob name inside the template store.
    pub fn file_name(&self) -> String {
        match self {
            TemplateRef::Atp => "atp.xlsx".to_string(),
            TemplateRef::Bast(..) => format!("{}.docx", self.id()),
        }
    }
}

/// Boundary to wherever the binary templates live. No caching: every
/// generation re-fetches so template updates take effect immediately.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn load(&self, template: &TemplateRef) -> Result<Vec<u8>, TemplateError>;
}

/// Templates as plain files in a directory.
pub struct DirTemplateStore {
    root: PathBuf,
}

impl DirTemplateStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl TemplateStore for DirTemplateStore {
    async fn load(&self, template: &TemplateRef) -> Result<Vec<u8>, TemplateError> {
        let path = self.root.join(template.file_name());
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound {
                    template_id: template.id(),
                })
            }
            Err(err) => Err(TemplateError::Io {
                template_id: template.id(),
                source: err,
            }),
        }
    }
}
