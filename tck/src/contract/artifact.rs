use std::{fmt, sync::Arc};

use stakemint_common::abi::{AbiError, MethodTable};

use crate::chain::ContractCode;

/// A pre-built contract: its method table plus executable code.
///
/// The artifact keeps a pristine instance of the code; every deployment
/// gets its own copy.
#[derive(Clone)]
pub struct ContractArtifact {
    name: String,
    version: String,
    table: Arc<MethodTable>,
    template: Arc<dyn ContractCode>,
}

impl ContractArtifact {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        table: Arc<MethodTable>,
        template: Arc<dyn ContractCode>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            table,
            template,
        }
    }

    /// Build an artifact from a JSON ABI document.
    pub fn from_abi_json(
        name: impl Into<String>,
        version: impl Into<String>,
        document: &str,
        template: Arc<dyn ContractCode>,
    ) -> Result<Self, AbiError> {
        let table = MethodTable::from_json(document)?;
        Ok(Self::new(name, version, Arc::new(table), template))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn table(&self) -> &Arc<MethodTable> {
        &self.table
    }

    /// Fresh code instance to hand to the execution client.
    pub fn instantiate(&self) -> Box<dyn ContractCode> {
        self.template.snapshot()
    }
}

impl fmt::Debug for ContractArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractArtifact")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("methods", &self.table.len())
            .finish_non_exhaustive()
    }
}
