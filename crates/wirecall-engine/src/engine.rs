//! Contract execution engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use wirecall_abi::{coerce_args, encode_call, load_abi, FormatOptions, Method};
use wirecall_primitives::Address;

use crate::error::EngineError;
use crate::gas;
use crate::monitor::{self, ActiveGuard, SessionHandle};
use crate::signer::Signer;
use crate::transport::Transport;
use crate::types::{CallRequest, ExecutionOutcome, ExecutionRequest, GasEstimate};

/// Executes methods of one contract over a transport.
///
/// Read methods are dispatched as queries and their results decoded and
/// formatted; write methods are estimated, given a gas margin and submitted
/// as transactions. At most one continuous session runs per engine.
pub struct ContractEngine {
    transport: Arc<dyn Transport>,
    signer: Option<Arc<dyn Signer>>,
    contract: Address,
    methods: Vec<Method>,
    format: FormatOptions,
    session_active: Arc<AtomicBool>,
}

impl ContractEngine {
    /// Create an engine for a contract with an already-resolved method set
    pub fn new(transport: Arc<dyn Transport>, contract: Address, methods: Vec<Method>) -> Self {
        Self {
            transport,
            signer: None,
            contract,
            methods,
            format: FormatOptions::default(),
            session_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create an engine from an ABI JSON document
    pub fn from_abi(
        transport: Arc<dyn Transport>,
        contract: Address,
        abi_json: &str,
    ) -> Result<Self, EngineError> {
        let methods = load_abi(abi_json)?;
        Ok(Self::new(transport, contract, methods))
    }

    /// Attach a signer, enabling write methods
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Override the result formatting configuration
    pub fn with_format_options(mut self, options: FormatOptions) -> Self {
        self.format = options;
        self
    }

    /// The contract this engine targets
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// The loaded method set
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Look up a method by name
    pub fn method(&self, name: &str) -> Result<&Method, EngineError> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| EngineError::UnknownMethod(name.to_string()))
    }

    /// Coerce the arguments and build the call request for an execution
    fn prepare(&self, exec: &ExecutionRequest) -> Result<(&Method, CallRequest), EngineError> {
        let method = self.method(&exec.method)?;
        let values = coerce_args(&method.inputs, &exec.args)?;
        let call = encode_call(method, &values)?;
        let request = CallRequest {
            from: self.signer.as_ref().map(|s| s.address()),
            to: Some(self.contract),
            value: exec.value,
            data: Some(Bytes::from(call.to_bytes())),
            ..Default::default()
        };
        Ok((method, request))
    }

    /// Execute a method once with no value attached and no overrides
    pub async fn execute(
        &self,
        name: &str,
        args: &[String],
    ) -> Result<ExecutionOutcome, EngineError> {
        self.execute_request(&ExecutionRequest::new(name, args.to_vec()))
            .await
    }

    /// Execute a method once.
    ///
    /// Read methods return their decoded and formatted values. Write methods
    /// require a signer; the transaction is submitted with the estimated gas
    /// plus margin and the current gas price, unless the request overrides
    /// either one.
    pub async fn execute_request(
        &self,
        exec: &ExecutionRequest,
    ) -> Result<ExecutionOutcome, EngineError> {
        let (method, request) = self.prepare(exec)?;
        let name = exec.method.as_str();

        if method.is_read() {
            debug!(method = %name, contract = %self.contract, "dispatching query");
            let data = self.transport.call(&request).await?;
            let values = wirecall_abi::decode_output(&method.outputs, &data)?;
            let formatted = wirecall_abi::format_outputs(&method.outputs, &values, &self.format);
            return Ok(ExecutionOutcome::Read { formatted, values });
        }

        if self.signer.is_none() {
            return Err(EngineError::SignerUnavailable(name.to_string()));
        }

        let gas_limit = match exec.gas_limit {
            Some(limit) => limit,
            None => {
                let raw = self
                    .transport
                    .estimate_gas(&request)
                    .await
                    .map_err(|e| EngineError::Estimation(e.to_string()))?;
                gas::with_margin(raw)
            }
        };
        let gas_price_wei = match exec.gas_price_wei {
            Some(price) => price,
            None => self.transport.gas_price().await?,
        };
        let estimate = GasEstimate {
            gas_limit,
            gas_price_wei,
            gas_price_gwei: gas::wei_to_gwei(gas_price_wei),
        };

        let mut submission = request;
        submission.gas = Some(estimate.gas_limit);
        submission.gas_price = Some(estimate.gas_price_wei);

        let tx_hash = self.transport.send_transaction(&submission).await?;
        info!(method = %name, tx_hash = %tx_hash, gas_limit = estimate.gas_limit, "transaction submitted");
        Ok(ExecutionOutcome::Write {
            tx_hash,
            gas: estimate,
        })
    }

    /// Estimate gas for a method call without executing it
    pub async fn estimate(&self, name: &str, args: &[String]) -> Result<GasEstimate, EngineError> {
        self.estimate_request(&ExecutionRequest::new(name, args.to_vec()))
            .await
    }

    /// Estimate gas for an execution request without submitting it
    pub async fn estimate_request(
        &self,
        exec: &ExecutionRequest,
    ) -> Result<GasEstimate, EngineError> {
        let (_, request) = self.prepare(exec)?;
        gas::estimate(self.transport.as_ref(), &request).await
    }

    /// Start a continuous execution session with no value attached
    pub fn start_continuous(
        &self,
        name: &str,
        args: &[String],
        interval: Duration,
    ) -> Result<SessionHandle, EngineError> {
        self.start_continuous_request(&ExecutionRequest::new(name, args.to_vec()), interval)
    }

    /// Start a continuous execution session for a write method.
    ///
    /// Arguments are coerced and encoded now; the session polls the frozen
    /// call until estimation succeeds, then submits exactly once. Only one
    /// session may be active per engine.
    pub fn start_continuous_request(
        &self,
        exec: &ExecutionRequest,
        interval: Duration,
    ) -> Result<SessionHandle, EngineError> {
        let (method, request) = self.prepare(exec)?;
        if method.is_read() {
            return Err(EngineError::NotWritable(exec.method.clone()));
        }
        if self.signer.is_none() {
            return Err(EngineError::SignerUnavailable(exec.method.clone()));
        }
        if self
            .session_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::SessionActive);
        }

        let guard = ActiveGuard::new(Arc::clone(&self.session_active));
        Ok(monitor::spawn(
            Arc::clone(&self.transport),
            exec.method.clone(),
            request,
            interval,
            guard,
        ))
    }
}
