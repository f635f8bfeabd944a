use dfi_construction::types::*;
use dfi_construction::{
    ApiError, Configuration, ConstructionError, MempoolService, Mode, NodeClient, UpstreamError,
};
use dfi_script::Network;

const SIGNED_TX: &str = "01000000000101372ae11cccd9acf162ced596fe6bb05b79d9cfd01b659068b3fffa9999e535d40000000000ffffffff02db910e00000000001600141d439fad544d8fa2b15048dc60f96bdfa4433c2471ae000000000000160014d88413b340d04dd9f19dc92a5c6836c6c6c69b8d02473044022025876ec8b9f51d343a5a56ac549c0c828005ef45ebe9da166db645c09157223f02204cd08b7278a8889a81135915bce10d1ef3bb92b217f81a0de7e79ffb3dfd6ac5012103d3d13e8180b10dfed0db4db9fb9013a5dcbdab64dff45d16310313c2929e71ac00000000";
const TXID: &str = "d72427f967dbe9691328c03cb0c4be74d33dd22b537cd4a081d6ba4da970e8fc";
const COIN: &str = "d435e59999faffb36890651bd0cfd9795bb06bfe96d5ce62f1acd9cc1ce12a37:0";

#[derive(Clone)]
struct MockNode {
    mempool: Vec<String>,
    raw: Result<Vec<u8>, UpstreamError>,
}

impl NodeClient for MockNode {
    async fn suggested_fee_rate(&self, _confirmation_target: u32) -> Result<f64, UpstreamError> {
        unreachable!("mempool never estimates fees")
    }

    async fn send_raw_transaction(&self, _raw: &str) -> Result<String, UpstreamError> {
        unreachable!("mempool never broadcasts")
    }

    async fn raw_mempool(&self) -> Result<Vec<String>, UpstreamError> {
        Ok(self.mempool.clone())
    }

    async fn raw_transaction(&self, txid: &str) -> Result<Vec<u8>, UpstreamError> {
        assert_eq!(txid, TXID);
        self.raw.clone()
    }
}

fn node() -> MockNode {
    MockNode {
        mempool: vec!["tx1".to_string(), "tx2".to_string()],
        raw: Ok(hex::decode(SIGNED_TX).unwrap()),
    }
}

fn service(mode: Mode, node: MockNode) -> MempoolService<MockNode> {
    MempoolService::new(Configuration::new(mode, Network::Testnet), node)
}

fn amount(value: i64) -> Amount {
    Amount {
        value: value.to_string(),
        currency: Currency {
            symbol: "tDFI".to_string(),
            decimals: 8,
        },
    }
}

#[tokio::test]
async fn test_mempool_offline() {
    let service = service(Mode::Offline, node());

    let err = service.mempool().await.unwrap_err();
    assert!(matches!(err, ConstructionError::UnavailableOffline));
    assert_eq!(ApiError::from(err).code, 1);

    let err = service.mempool_transaction(TXID).await.unwrap_err();
    assert!(matches!(err, ConstructionError::UnavailableOffline));
}

#[tokio::test]
async fn test_mempool_lists_identifiers() {
    let response = service(Mode::Online, node()).mempool().await.unwrap();
    assert_eq!(
        response.transaction_identifiers,
        vec![
            TransactionIdentifier {
                hash: "tx1".to_string()
            },
            TransactionIdentifier {
                hash: "tx2".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_mempool_transaction_operations() {
    let response = service(Mode::Online, node())
        .mempool_transaction(TXID)
        .await
        .unwrap();
    let tx = response.transaction;
    assert_eq!(tx.transaction_identifier.hash, TXID);
    assert_eq!(
        tx.operations,
        vec![
            Operation {
                operation_identifier: OperationIdentifier {
                    index: 0,
                    network_index: Some(0),
                },
                operation_type: "INPUT".to_string(),
                account: Some(AccountIdentifier::new(
                    "tf1q4mfg3kqm4c7f8j7tyy028fa4uaw7zdzyerq5qx"
                )),
                amount: None,
                coin_change: Some(CoinChange {
                    coin_identifier: CoinIdentifier {
                        identifier: COIN.to_string(),
                    },
                    coin_action: CoinAction::CoinSpent,
                }),
            },
            Operation {
                operation_identifier: OperationIdentifier {
                    index: 1,
                    network_index: Some(0),
                },
                operation_type: "OUTPUT".to_string(),
                account: Some(AccountIdentifier::new(
                    "tf1qr4pelt25fk869v2sfrwxp7ttm7jyx0pyn4dxph"
                )),
                amount: Some(amount(954_843)),
                coin_change: None,
            },
            Operation {
                operation_identifier: OperationIdentifier {
                    index: 2,
                    network_index: Some(1),
                },
                operation_type: "OUTPUT".to_string(),
                account: Some(AccountIdentifier::new(
                    "tf1qmzzp8v6q6pxanuvaey49c6pkcmrvdxudun0v8j"
                )),
                amount: Some(amount(44_657)),
                coin_change: None,
            },
        ]
    );
}

#[tokio::test]
async fn test_mempool_transaction_unknown_to_node() {
    let node = MockNode {
        raw: Err(UpstreamError::Node {
            code: -5,
            message: "No such mempool or blockchain transaction".to_string(),
        }),
        ..node()
    };
    let err = service(Mode::Online, node)
        .mempool_transaction(TXID)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::Upstream {
            source: UpstreamError::Node { code: -5, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_mempool_transaction_undecodable_bytes() {
    let node = MockNode {
        raw: Ok(vec![0x01, 0x00]),
        ..node()
    };
    let err = service(Mode::Online, node)
        .mempool_transaction(TXID)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::Upstream {
            source: UpstreamError::InvalidResponse(_),
            ..
        }
    ));
}
