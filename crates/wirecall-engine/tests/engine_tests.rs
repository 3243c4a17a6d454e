//! End-to-end engine tests over the mock transport

use std::sync::Arc;
use std::time::Duration;

use wirecall_abi::types::{ParamType, Value};
use wirecall_abi::encode_params;
use wirecall_engine::{
    ContractEngine, EngineError, ExecutionOutcome, ExecutionRequest, MockTransport, SessionState,
    StaticSigner, TransportError,
};
use wirecall_primitives::{Address, U256};

const SALE_ABI: &str = r#"[
    {
        "type": "function",
        "name": "saleInfo",
        "inputs": [],
        "outputs": [
            {"name": "price", "type": "uint256"},
            {"name": "startTimeUnixSeconds", "type": "uint256"}
        ],
        "stateMutability": "view"
    },
    {
        "type": "function",
        "name": "claim",
        "inputs": [{"name": "quantity", "type": "uint256"}],
        "outputs": [],
        "stateMutability": "payable"
    }
]"#;

fn contract() -> Address {
    Address::from_bytes([0xaa; 20])
}

fn signer() -> Arc<StaticSigner> {
    Arc::new(StaticSigner::new(Address::from_bytes([0x11; 20])))
}

fn engine(transport: Arc<MockTransport>) -> ContractEngine {
    ContractEngine::from_abi(transport, contract(), SALE_ABI)
        .expect("valid ABI")
        .with_signer(signer())
}

#[tokio::test]
async fn test_read_decodes_and_formats() {
    let transport = Arc::new(MockTransport::new());
    let result = encode_params(
        &[ParamType::Uint(256), ParamType::Uint(256)],
        &[
            Value::Uint(U256::from(2_500_000_000_000_000_000u128)),
            Value::Uint(U256::zero()),
        ],
    )
    .unwrap();
    transport.set_call_result(result);

    let engine = engine(Arc::clone(&transport));
    let outcome = engine.execute("saleInfo", &[]).await.unwrap();

    match outcome {
        ExecutionOutcome::Read { formatted, values } => {
            assert_eq!(
                formatted,
                "price: 2.5 ETH (2500000000000000000 wei)\nstartTimeUnixSeconds: 0 (Not set)"
            );
            assert_eq!(values.len(), 2);
        }
        other => panic!("expected Read outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_write_submits_with_margin() {
    let transport = Arc::new(MockTransport::new());
    transport.push_estimate(Ok(21000));
    transport.set_gas_price(2_000_000_000);

    let engine = engine(Arc::clone(&transport));
    let outcome = engine
        .execute("claim", &["1".to_string()])
        .await
        .unwrap();

    match outcome {
        ExecutionOutcome::Write { tx_hash, gas } => {
            assert_eq!(tx_hash, transport.tx_hash());
            assert_eq!(gas.gas_limit, 25200);
            assert_eq!(gas.gas_price_gwei, 2);
        }
        other => panic!("expected Write outcome, got {:?}", other),
    }
    assert_eq!(transport.send_count(), 1);
}

#[tokio::test]
async fn test_write_with_overrides_skips_estimation() {
    let transport = Arc::new(MockTransport::new());
    let engine = engine(Arc::clone(&transport));

    let request = ExecutionRequest::new("claim", vec!["2".to_string()])
        .with_value(U256::from(1_000_000_000_000_000u64))
        .with_gas_limit(120_000)
        .with_gas_price(3_000_000_000);
    let outcome = engine.execute_request(&request).await.unwrap();

    match outcome {
        ExecutionOutcome::Write { gas, .. } => {
            assert_eq!(gas.gas_limit, 120_000);
            assert_eq!(gas.gas_price_gwei, 3);
        }
        other => panic!("expected Write outcome, got {:?}", other),
    }
    // Both overrides supplied, so no estimation or price RPCs were needed
    assert_eq!(transport.estimate_count(), 0);
    assert_eq!(transport.send_count(), 1);
}

#[tokio::test]
async fn test_write_without_signer_fails_before_transport() {
    let transport = Arc::new(MockTransport::new());
    let engine = ContractEngine::from_abi(Arc::<MockTransport>::clone(&transport), contract(), SALE_ABI).unwrap();

    let err = engine
        .execute("claim", &["1".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SignerUnavailable(_)));
    assert_eq!(transport.estimate_count(), 0);
    assert_eq!(transport.send_count(), 0);
}

#[tokio::test]
async fn test_unknown_method() {
    let transport = Arc::new(MockTransport::new());
    let engine = engine(transport);
    let err = engine.execute("mint", &[]).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownMethod(name) if name == "mint"));
}

#[tokio::test]
async fn test_bad_argument_fails_before_transport() {
    let transport = Arc::new(MockTransport::new());
    let engine = engine(Arc::clone(&transport));

    let err = engine
        .execute("claim", &["-3".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Parameter(_)));
    assert_eq!(transport.estimate_count(), 0);
}

#[tokio::test]
async fn test_estimate_surfaces_node_message() {
    let transport = Arc::new(MockTransport::new());
    transport.push_estimate(Err(TransportError::Rpc {
        code: 3,
        message: "execution reverted: sale not open".to_string(),
    }));

    let engine = engine(transport);
    let err = engine
        .estimate("claim", &["1".to_string()])
        .await
        .unwrap_err();
    match err {
        EngineError::Estimation(message) => assert!(message.contains("sale not open")),
        other => panic!("expected Estimation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_continuous_polls_then_executes() {
    let transport = Arc::new(MockTransport::new());
    transport.push_estimate(Err(TransportError::Rpc {
        code: 3,
        message: "execution reverted: sale not open".to_string(),
    }));
    transport.push_estimate(Err(TransportError::Rpc {
        code: 3,
        message: "execution reverted: sale not open".to_string(),
    }));
    transport.push_estimate(Ok(80000));

    let engine = engine(Arc::clone(&transport));
    let session = engine
        .start_continuous("claim", &["1".to_string()], Duration::from_millis(10))
        .unwrap();

    let final_state = session.wait().await;
    assert_eq!(final_state, SessionState::Succeeded);
    assert_eq!(transport.estimate_count(), 3);
    assert_eq!(transport.send_count(), 1);
}

#[tokio::test]
async fn test_continuous_rejects_read_methods() {
    let transport = Arc::new(MockTransport::new());
    let engine = engine(transport);
    let err = engine
        .start_continuous("saleInfo", &[], Duration::from_millis(10))
        .unwrap_err();
    assert!(matches!(err, EngineError::NotWritable(_)));
}

#[tokio::test]
async fn test_single_active_session() {
    let transport = Arc::new(MockTransport::new());
    transport.set_estimate_error("sale not open");

    let engine = engine(Arc::clone(&transport));
    let session = engine
        .start_continuous("claim", &["1".to_string()], Duration::from_millis(5000))
        .unwrap();

    let err = engine
        .start_continuous("claim", &["1".to_string()], Duration::from_millis(10))
        .unwrap_err();
    assert!(matches!(err, EngineError::SessionActive));

    session.stop();
    assert_eq!(session.wait().await, SessionState::Stopped);

    // Once the first session has fully wound down, a new one may start
    let second = engine
        .start_continuous("claim", &["1".to_string()], Duration::from_millis(10))
        .unwrap();
    second.stop();
    assert_eq!(second.wait().await, SessionState::Stopped);
    assert_eq!(transport.send_count(), 0);
}
