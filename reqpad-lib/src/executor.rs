use crate::body::encode_body;
use crate::content_type::is_json_content_type;
use crate::debug_log;
use crate::headers::{compute_effective_headers, HeaderEntry};
use crate::request::{RequestDefinition, RequestId, ResponseBody, Settlement};
use crate::store::{ExecutionTicket, StoreError, Workspace};
use crate::transport::{PreparedRequest, Transport, TransportResponse};
use crate::url::assemble_url;
use crate::variables::{Variable, VariableTable};
use std::sync::Mutex;
use std::time::Duration;

/// Composes the exact call a request definition describes, given the current snapshots.
pub fn prepare(
    request: &RequestDefinition,
    variables: &[Variable],
    globals: &[HeaderEntry],
) -> PreparedRequest {
    let table = VariableTable::from_variables(variables);
    let mut headers =
        compute_effective_headers(&request.headers, request.use_global_auth, globals, &table);
    if headers.local_fallback() {
        debug_log!(
            "Headers of '{}' are not a JSON object, sending without local headers",
            request.name
        );
    }
    let body = encode_body(
        request.method,
        request.body_type,
        &request.body_json,
        &request.body_form_data,
        &table,
    );
    if body.removes_content_type() {
        headers.remove_ignore_case(crate::content_type::HEADER);
    }
    PreparedRequest {
        method: request.method,
        url: assemble_url(&request.endpoint, &table),
        headers: headers.into_vec(),
        body,
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

fn interpret(response: TransportResponse, time_ms: u64) -> Settlement {
    let body = if is_json_content_type(response.content_type()) {
        match serde_json::from_str(&response.body) {
            Ok(value) => ResponseBody::Json(value),
            Err(e) => return Settlement::failure(format!("Invalid JSON response: {e}")),
        }
    } else {
        ResponseBody::Text(response.body)
    };
    Settlement::success(response.status, response.status_text, time_ms, body)
}

/// Result of one [`Executor::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub ticket: ExecutionTicket,
    pub settlement: Settlement,
    /// False when a newer execution of the same request started before this one finished.
    pub applied: bool,
}

pub struct Executor<T: Transport> {
    transport: T,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one call. Every failure becomes a failed [`Settlement`], never an `Err`.
    pub async fn execute(
        &self,
        request: &RequestDefinition,
        variables: &[Variable],
        globals: &[HeaderEntry],
    ) -> Settlement {
        let prepared = prepare(request, variables, globals);
        debug_log!(
            "Request '{}': {} {}",
            request.name,
            prepared.method,
            prepared.url
        );

        let settlement = match self.transport.send(prepared).await {
            Ok(response) => {
                let time_ms = elapsed_ms(response.elapsed);
                interpret(response, time_ms)
            }
            Err(e) => Settlement::failure(e.to_string()),
        };
        debug_log!(
            "Request '{}' settled: {} {} ({} ms)",
            request.name,
            settlement.status.code,
            settlement.status.text,
            settlement.status.time_ms
        );
        settlement
    }

    /// Runs the full lifecycle of request `id` against a shared workspace.
    ///
    /// The lock is held only to take snapshots and to write the result, never across the
    /// network call. A result is written back only if no later run of the same request
    /// began in the meantime.
    pub async fn run(
        &self,
        workspace: &Mutex<Workspace>,
        id: RequestId,
    ) -> Result<RunReport, StoreError> {
        let (ticket, request, variables, globals) = {
            let mut ws = workspace.lock().map_err(|_| StoreError::Poisoned)?;
            let ticket = ws.requests.begin_execution(id)?;
            let request = ws
                .requests
                .get(id)
                .cloned()
                .ok_or(StoreError::RequestNotFound(id))?;
            (
                ticket,
                request,
                ws.variables.snapshot().to_vec(),
                ws.global_headers.snapshot().to_vec(),
            )
        };

        let settlement = self.execute(&request, &variables, &globals).await;

        let applied = {
            let mut ws = workspace.lock().map_err(|_| StoreError::Poisoned)?;
            ws.requests.settle(ticket, settlement.clone())
        };
        if !applied {
            debug_log!(
                "Discarding result of '{}' generation {}: superseded",
                request.name,
                ticket.generation
            );
        }
        Ok(RunReport {
            ticket,
            settlement,
            applied,
        })
    }
}
