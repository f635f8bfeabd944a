//! The construction pipeline: Derive, Preprocess, Metadata, Payloads,
//! Parse, Combine, Hash and Submit.
//!
//! Each stage is a function of its request plus at most the collaborator
//! lookups of Metadata and Submit. Those two stages refuse to run offline.

use dfi_primitives::ec::{compact_to_der, PublicKey as Secp256k1PublicKey};
use dfi_script::{derive_address, ScriptClass};
use dfi_transaction::sighash::{script_code_for, SigHashMidstate, SIGHASH_ALL};
use dfi_transaction::{Transaction, Witness};
use tracing::{debug, info};

use crate::client::{call_upstream, Indexer, NodeClient, UpstreamError};
use crate::coins::select_coins;
use crate::config::Configuration;
use crate::envelope::{Envelope, SignedTransaction, UnsignedTransaction};
use crate::error::ConstructionError;
use crate::fee::{estimate_size, suggested_fee, validate_multiplier};
use crate::operations::{signer_address, InputContext, OperationMapper};
use crate::types::{
    AccountIdentifier, Amount, CombineRequest, CombineResponse, ConstructionMetadata, CurveType,
    DeriveResponse, MetadataResponse, ParseRequest, ParseResponse, PayloadsRequest,
    PayloadsResponse, PreprocessOptions, PreprocessRequest, PreprocessResponse, PublicKey,
    SignatureType, SigningPayload, TransactionIdentifier, TransactionIdentifierResponse,
};

/// Construction API service over a node client and an indexer.
#[derive(Debug, Clone)]
pub struct ConstructionService<C, I> {
    config: Configuration,
    client: C,
    indexer: I,
}

impl<C: NodeClient, I: Indexer> ConstructionService<C, I> {
    pub fn new(config: Configuration, client: C, indexer: I) -> Self {
        ConstructionService {
            config,
            client,
            indexer,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    fn mapper(&self) -> OperationMapper<'_> {
        OperationMapper::new(self.config.params, &self.config.currency)
    }

    // -----------------------------------------------------------------
    // Derive
    // -----------------------------------------------------------------

    /// Native segwit address of a secp256k1 public key.
    pub fn derive(&self, public_key: &PublicKey) -> Result<DeriveResponse, ConstructionError> {
        debug!(curve = ?public_key.curve_type, "derive");
        let key = parse_public_key(public_key)?;
        let address = derive_address(&key.to_compressed(), self.config.params)
            .map_err(|e| ConstructionError::InvalidPublicKey(e.to_string()))?;
        Ok(DeriveResponse {
            account_identifier: AccountIdentifier::new(address),
        })
    }

    // -----------------------------------------------------------------
    // Preprocess
    // -----------------------------------------------------------------

    /// Validate operations and produce the options Metadata needs.
    pub fn preprocess(
        &self,
        request: &PreprocessRequest,
    ) -> Result<PreprocessResponse, ConstructionError> {
        debug!(operations = request.operations.len(), "preprocess");
        validate_multiplier(request.suggested_fee_multiplier)?;

        let intent = self.mapper().from_operations(&request.operations)?;
        let coins = select_coins(&request.operations)?;
        let (inputs, outputs) = (intent.total_input()?, intent.total_output()?);
        if outputs > inputs {
            return Err(ConstructionError::InsufficientFunds { inputs, outputs });
        }

        let estimated_size = estimate_size(
            intent.inputs.iter().map(|i| &i.script_pubkey),
            intent.outputs.iter().map(|o| &o.script_pubkey),
        );
        Ok(PreprocessResponse {
            options: PreprocessOptions {
                coins,
                estimated_size,
                fee_multiplier: request.suggested_fee_multiplier,
            },
        })
    }

    // -----------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------

    /// Look up the spent scripts and suggest a fee.
    pub async fn metadata(
        &self,
        options: &PreprocessOptions,
    ) -> Result<MetadataResponse, ConstructionError> {
        self.config.ensure_online()?;
        debug!(coins = options.coins.len(), size = options.estimated_size, "metadata");
        validate_multiplier(options.fee_multiplier)?;

        let timeout = self.config.upstream_timeout;
        let (script_pub_keys, fee_rate) = tokio::try_join!(
            call_upstream(
                "script lookup",
                timeout,
                self.indexer.script_pub_keys(&options.coins)
            ),
            call_upstream(
                "fee estimation",
                timeout,
                self.client.suggested_fee_rate(self.config.confirmation_target)
            ),
        )?;

        if script_pub_keys.len() != options.coins.len() {
            return Err(ConstructionError::Upstream {
                operation: "script lookup",
                source: UpstreamError::InvalidResponse(format!(
                    "{} scripts for {} coins",
                    script_pub_keys.len(),
                    options.coins.len()
                )),
            });
        }
        if !fee_rate.is_finite() || fee_rate < 0.0 {
            return Err(ConstructionError::Upstream {
                operation: "fee estimation",
                source: UpstreamError::InvalidResponse(format!("fee rate {fee_rate}")),
            });
        }

        let fee = suggested_fee(fee_rate, options.estimated_size, options.fee_multiplier);
        info!(fee_rate, fee, "suggested fee");
        let fee = i64::try_from(fee)
            .map_err(|_| ConstructionError::InvalidAmount(format!("fee {fee} overflows")))?;

        Ok(MetadataResponse {
            metadata: ConstructionMetadata { script_pub_keys },
            suggested_fee: vec![Amount::new(fee, &self.config.currency)],
        })
    }

    // -----------------------------------------------------------------
    // Payloads
    // -----------------------------------------------------------------

    /// Build the unsigned transaction and one signing payload per input.
    pub fn payloads(
        &self,
        request: &PayloadsRequest,
    ) -> Result<PayloadsResponse, ConstructionError> {
        debug!(operations = request.operations.len(), "payloads");
        let intent = self.mapper().from_operations(&request.operations)?;
        select_coins(&request.operations)?;

        let scripts = &request.metadata.script_pub_keys;
        if scripts.len() != intent.inputs.len() {
            return Err(ConstructionError::ScriptCountMismatch {
                scripts: scripts.len(),
                inputs: intent.inputs.len(),
            });
        }

        let tx = intent.to_unsigned_transaction();
        let midstate = SigHashMidstate::new(&tx);
        let mut payloads = Vec::with_capacity(intent.inputs.len());
        for (index, (input, spk)) in intent.inputs.iter().zip(scripts).enumerate() {
            let script = spk
                .script()
                .map_err(|source| ConstructionError::InvalidScript { index, source })?;
            if script.classify() != ScriptClass::WitnessV0KeyHash {
                return Err(ConstructionError::UnsupportedScriptType {
                    index,
                    script_type: spk.script_type.clone(),
                });
            }
            let script_code = script_code_for(&script);
            let digest = midstate.signature_hash(
                &tx,
                index,
                script_code.as_bytes(),
                input.amount.unsigned_abs(),
                SIGHASH_ALL,
            )?;
            payloads.push(SigningPayload {
                account_identifier: AccountIdentifier::new(input.address.clone()),
                hex_bytes: digest.to_vec(),
                signature_type: SignatureType::Ecdsa,
            });
        }

        let unsigned = UnsignedTransaction {
            transaction: tx.to_hex(),
            script_pub_keys: scripts.clone(),
            input_amounts: intent.inputs.iter().map(|i| i.amount.to_string()).collect(),
            input_addresses: intent.inputs.iter().map(|i| i.address.clone()).collect(),
        };
        Ok(PayloadsResponse {
            unsigned_transaction: unsigned.encode()?,
            payloads,
        })
    }

    // -----------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------

    /// Recover operations (and, for signed transactions, signers) from a
    /// transaction envelope.
    pub fn parse(&self, request: &ParseRequest) -> Result<ParseResponse, ConstructionError> {
        debug!(signed = request.signed, "parse");
        let (tx, contexts) = if request.signed {
            let envelope = SignedTransaction::decode(&request.transaction)?;
            let tx = envelope.decode_transaction()?;
            let mut contexts = Vec::with_capacity(tx.inputs.len());
            for (index, (input, amount)) in tx.inputs.iter().zip(envelope.amounts()?).enumerate() {
                let signer = signer_address(input).ok_or(ConstructionError::UnknownSigner(index))?;
                let account = signer
                    .encode(self.config.params)
                    .map_err(|_| ConstructionError::UnknownSigner(index))?;
                contexts.push(InputContext {
                    account: Some(account),
                    amount: Some(amount),
                });
            }
            (tx, contexts)
        } else {
            let envelope = UnsignedTransaction::decode(&request.transaction)?;
            let tx = envelope.decode_transaction()?;
            let contexts = envelope
                .input_addresses
                .iter()
                .zip(envelope.amounts()?)
                .map(|(address, amount)| InputContext {
                    account: Some(address.clone()),
                    amount: Some(amount),
                })
                .collect::<Vec<_>>();
            (tx, contexts)
        };

        let operations = self.mapper().to_operations(&tx, &contexts)?;
        let account_identifier_signers = if request.signed {
            contexts
                .into_iter()
                .filter_map(|c| c.account.map(AccountIdentifier::new))
                .collect()
        } else {
            Vec::new()
        };
        Ok(ParseResponse {
            operations,
            account_identifier_signers,
        })
    }

    // -----------------------------------------------------------------
    // Combine
    // -----------------------------------------------------------------

    /// Place each signature in the witness of the input whose payload it
    /// signs.
    pub fn combine(&self, request: &CombineRequest) -> Result<CombineResponse, ConstructionError> {
        debug!(signatures = request.signatures.len(), "combine");
        let envelope = UnsignedTransaction::decode(&request.unsigned_transaction)?;
        let mut tx = envelope.decode_transaction()?;
        if request.signatures.len() != tx.inputs.len() {
            return Err(ConstructionError::SignatureCountMismatch {
                expected: tx.inputs.len(),
                got: request.signatures.len(),
            });
        }

        let payloads = input_payloads(&tx, &envelope)?;
        let mut signed = vec![false; tx.inputs.len()];

        for (sig_index, signature) in request.signatures.iter().enumerate() {
            if signature.signature_type != SignatureType::Ecdsa {
                return Err(ConstructionError::UnsupportedSignatureType(signature.signature_type));
            }
            let index = payloads
                .iter()
                .enumerate()
                .position(|(i, payload)| {
                    !signed[i] && payload.as_slice() == signature.signing_payload.hex_bytes.as_slice()
                })
                .ok_or(ConstructionError::UnmatchedSignature(sig_index))?;

            let key = parse_public_key(&signature.public_key)?;
            let script = envelope.script_pub_keys[index]
                .script()
                .map_err(|source| ConstructionError::InvalidScript { index, source })?;
            match script.witness_program() {
                Some((0, program)) if program == key.hash160().as_slice() => {}
                _ => return Err(ConstructionError::PublicKeyMismatch { index }),
            }

            let mut der = compact_to_der(&signature.hex_bytes)
                .map_err(|e| ConstructionError::InvalidSignature(e.to_string()))?;
            der.push(SIGHASH_ALL as u8);
            tx.inputs[index].witness = Witness(vec![der, key.to_compressed().to_vec()]);
            signed[index] = true;
        }

        let signed = SignedTransaction {
            transaction: tx.to_hex(),
            input_amounts: envelope.input_amounts.clone(),
        };
        Ok(CombineResponse {
            signed_transaction: signed.encode()?,
        })
    }

    // -----------------------------------------------------------------
    // Hash
    // -----------------------------------------------------------------

    /// Identifier of a signed transaction.
    pub fn hash(
        &self,
        signed_transaction: &str,
    ) -> Result<TransactionIdentifierResponse, ConstructionError> {
        let tx = SignedTransaction::decode(signed_transaction)?.decode_transaction()?;
        let hash = tx.txid().to_string();
        debug!(%hash, "hash");
        Ok(TransactionIdentifierResponse {
            transaction_identifier: TransactionIdentifier { hash },
        })
    }

    // -----------------------------------------------------------------
    // Submit
    // -----------------------------------------------------------------

    /// Broadcast a signed transaction through the node.
    pub async fn submit(
        &self,
        signed_transaction: &str,
    ) -> Result<TransactionIdentifierResponse, ConstructionError> {
        self.config.ensure_online()?;
        let tx = SignedTransaction::decode(signed_transaction)?.decode_transaction()?;
        let raw = tx.to_hex();
        debug!(size = raw.len() / 2, "submit");

        let hash = call_upstream(
            "broadcast",
            self.config.upstream_timeout,
            self.client.send_raw_transaction(&raw),
        )
        .await?;
        info!(%hash, "transaction submitted");
        Ok(TransactionIdentifierResponse {
            transaction_identifier: TransactionIdentifier { hash },
        })
    }
}

/// Validate an API public key as a secp256k1 point.
fn parse_public_key(public_key: &PublicKey) -> Result<Secp256k1PublicKey, ConstructionError> {
    if public_key.curve_type != CurveType::Secp256k1 {
        return Err(ConstructionError::UnsupportedCurveType(format!(
            "{:?}",
            public_key.curve_type
        )));
    }
    Secp256k1PublicKey::from_bytes(&public_key.hex_bytes)
        .map_err(|e| ConstructionError::InvalidPublicKey(e.to_string()))
}

/// Recompute the signing payload of every input of an unsigned envelope.
fn input_payloads(
    tx: &Transaction,
    envelope: &UnsignedTransaction,
) -> Result<Vec<[u8; 32]>, ConstructionError> {
    let midstate = SigHashMidstate::new(tx);
    let amounts = envelope.amounts()?;
    envelope
        .script_pub_keys
        .iter()
        .zip(amounts)
        .enumerate()
        .map(|(index, (spk, amount))| {
            let script = spk
                .script()
                .map_err(|source| ConstructionError::InvalidScript { index, source })?;
            let script_code = script_code_for(&script);
            Ok(midstate.signature_hash(
                tx,
                index,
                script_code.as_bytes(),
                amount.unsigned_abs(),
                SIGHASH_ALL,
            )?)
        })
        .collect()
}
