//! The output-script description reported by the node and indexer.

use dfi_primitives::hash::hash160;

use crate::address::{Address, NetworkParams};
use crate::script::{Script, ScriptClass};
use crate::ScriptError;

/// Script class plus the addresses a script pays to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub class: ScriptClass,
    pub addresses: Vec<String>,
    pub required_sigs: u32,
}

/// Classify a script and extract the addresses it pays to.
///
/// Bare public keys and multisig keys are reported as their P2PKH
/// addresses. Templates without an address report none and zero
/// required signatures.
pub fn classify_script(
    script: &Script,
    params: &NetworkParams,
) -> Result<Classification, ScriptError> {
    let class = script.classify();
    let (addresses, required_sigs) = match class {
        ScriptClass::PubKeyHash
        | ScriptClass::ScriptHash
        | ScriptClass::WitnessV0KeyHash
        | ScriptClass::WitnessV0ScriptHash => match Address::from_script(script) {
            Some(address) => (vec![address.encode(params)?], 1),
            None => (Vec::new(), 0),
        },
        ScriptClass::PubKey => match script.p2pk_key() {
            Some(key) => (vec![Address::PubKeyHash(hash160(key)).encode(params)?], 1),
            None => (Vec::new(), 0),
        },
        ScriptClass::MultiSig => match script.multisig() {
            Some((required, keys)) => {
                let addresses = keys
                    .iter()
                    .map(|k| Address::PubKeyHash(hash160(k)).encode(params))
                    .collect::<Result<Vec<_>, _>>()?;
                (addresses, required as u32)
            }
            None => (Vec::new(), 0),
        },
        ScriptClass::NullData | ScriptClass::WitnessUnknown | ScriptClass::NonStandard => {
            (Vec::new(), 0)
        }
    };
    Ok(Classification {
        class,
        addresses,
        required_sigs,
    })
}

/// JSON description of an output script, in the node's `scriptPubKey`
/// shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptPubKey {
    pub asm: String,
    pub hex: String,
    #[serde(rename = "reqSigs", default, skip_serializing_if = "is_zero")]
    pub required_sigs: u32,
    #[serde(rename = "type")]
    pub script_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl ScriptPubKey {
    /// Describe a script as the node would for the given network.
    pub fn from_script(script: &Script, params: &NetworkParams) -> Result<Self, ScriptError> {
        let classification = classify_script(script, params)?;
        Ok(ScriptPubKey {
            asm: script.to_asm(),
            hex: script.to_hex(),
            required_sigs: classification.required_sigs,
            script_type: classification.class.as_str().to_string(),
            addresses: classification.addresses,
        })
    }

    /// The raw script described by `hex`.
    pub fn script(&self) -> Result<Script, ScriptError> {
        Script::from_hex(&self.hex)
    }

    pub fn class(&self) -> ScriptClass {
        ScriptClass::from_type_tag(&self.script_type)
    }
}
