//! String-in, string-out invocation surface over the ledger.
//!
//! The external execution environment names an operation and passes its
//! arguments as strings; results come back as the ledger's JSON wire format.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::ledger::LotLedger;
use crate::reader::LotRead;

/// An operation exposed to the invocation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    InitLedger,
    CreateAsset,
    ReadAsset,
    UpdateAsset,
    DeleteAsset,
    AssetExists,
    TransferAsset,
    GetAllAssets,
}

impl Function {
    pub const ALL: [Function; 8] = [
        Function::InitLedger,
        Function::CreateAsset,
        Function::ReadAsset,
        Function::UpdateAsset,
        Function::DeleteAsset,
        Function::AssetExists,
        Function::TransferAsset,
        Function::GetAllAssets,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::InitLedger => "InitLedger",
            Function::CreateAsset => "CreateAsset",
            Function::ReadAsset => "ReadAsset",
            Function::UpdateAsset => "UpdateAsset",
            Function::DeleteAsset => "DeleteAsset",
            Function::AssetExists => "AssetExists",
            Function::TransferAsset => "TransferAsset",
            Function::GetAllAssets => "GetAllAssets",
        }
    }

    /// Names of the arguments the function takes, in order.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Function::InitLedger | Function::GetAllAssets => &[],
            Function::ReadAsset | Function::DeleteAsset | Function::AssetExists => &["lotId"],
            Function::CreateAsset | Function::UpdateAsset => &[
                "lotId",
                "propagationMethod",
                "propagationDate",
                "propagationQuantity",
            ],
            Function::TransferAsset => &["lotId", "newOwner"],
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Function::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown function {:?}", s)))
    }
}

/// Dispatches named invocations onto a [`LotLedger`].
pub struct LotContract {
    ledger: LotLedger,
}

impl LotContract {
    pub fn new(ledger: LotLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &LotLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> LotLedger {
        self.ledger
    }

    /// Invokes `function` with positional string arguments.
    ///
    /// | function        | returns                                   |
    /// |-----------------|-------------------------------------------|
    /// | `CreateAsset`   | the created lot as JSON                   |
    /// | `ReadAsset`     | the stored JSON, verbatim                 |
    /// | `AssetExists`   | `"true"` or `"false"`                     |
    /// | `GetAllAssets`  | JSON array of `{"Key": .., "Record": ..}` |
    /// | everything else | empty string                              |
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for an unknown function or the wrong number of
    /// arguments; otherwise whatever the ledger operation returns.
    #[tracing::instrument(level = "debug", skip(self, args))]
    pub async fn invoke<S: AsRef<str>>(&self, function: &str, args: &[S]) -> Result<String> {
        let function: Function = function.parse()?;
        let params = function.params();
        if args.len() != params.len() {
            return Err(Error::InvalidInput(format!(
                "{} expects {} argument(s) ({}), got {}",
                function,
                params.len(),
                params.join(", "),
                args.len()
            )));
        }
        let arg = |i: usize| args[i].as_ref();

        match function {
            Function::InitLedger => {
                self.ledger.seed().await?;
                Ok(String::new())
            }
            Function::CreateAsset => {
                let lot = self.ledger.create(arg(0), arg(1), arg(2), arg(3)).await?;
                to_json(&lot)
            }
            Function::ReadAsset => self.ledger.read_raw(arg(0)).await,
            Function::UpdateAsset => {
                self.ledger.update(arg(0), arg(1), arg(2), arg(3)).await?;
                Ok(String::new())
            }
            Function::DeleteAsset => {
                self.ledger.delete(arg(0)).await?;
                Ok(String::new())
            }
            Function::AssetExists => Ok(self.ledger.exists(arg(0)).await?.to_string()),
            Function::TransferAsset => {
                self.ledger.transfer(arg(0), arg(1)).await?;
                Ok(String::new())
            }
            Function::GetAllAssets => {
                let entries = self.ledger.list_all().await?.collect().await?;
                to_json(&entries)
            }
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Encoding(e.to_string()))
}
