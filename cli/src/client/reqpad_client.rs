use super::models::{ClientConfig, RequestDetails, RequestExecutionResult, RequestInfo};
use crate::collection::Collection;
use crate::core::error::AppError;
use reqpad_lib::debug_log;
use reqpad_lib::{
    prepare, Executor, HeaderEntry, RequestDefinition, RequestPatch, ReqwestTransport, Settlement,
    StoreError, Variable, Workspace,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct ReqpadClient {
    config: ClientConfig,
}

impl ReqpadClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<Vec<RequestExecutionResult>, AppError> {
        let collection = Collection::load(Path::new(&self.config.source_path))?;
        let overrides = parse_cli_variables(&self.config.variables);
        let workspace =
            collection.into_workspace(self.config.environment.as_deref(), &overrides)?;

        let indices = self.select_requests(&collection)?;
        debug_log!("Running {} request(s)", indices.len());

        let workspace = Mutex::new(workspace);
        let executor = Executor::new(
            ReqwestTransport::new().with_user_agent(crate::core::version::user_agent()),
        );

        let mut results = Vec::new();
        for index in indices {
            let id = lock(&workspace)?.requests.requests()[index].id;

            // A missing attachment fails this request only; the rest still run.
            let settlement = match collection.load_form_data(index) {
                Ok(rows) => {
                    let patch = RequestPatch {
                        body_form_data: Some(rows),
                        ..RequestPatch::default()
                    };
                    lock(&workspace)?.requests.update_request(id, patch)?;
                    executor.run(&workspace, id).await?.settlement
                }
                Err(e) => {
                    debug_log!("Not sending request {index}: {e}");
                    let settlement = Settlement::failure(e.to_string());
                    let mut ws = lock(&workspace)?;
                    let ticket = ws.requests.begin_execution(id)?;
                    ws.requests.settle(ticket, settlement.clone());
                    settlement
                }
            };

            let ws = lock(&workspace)?;
            let request = ws
                .requests
                .get(id)
                .ok_or(StoreError::RequestNotFound(id))?;
            let prepared = prepare(
                request,
                ws.variables.snapshot(),
                ws.global_headers.snapshot(),
            );
            results.push(RequestExecutionResult {
                request_name: request.name.clone(),
                method: prepared.method.as_str().to_string(),
                url: prepared.url,
                status: settlement.status,
                response: settlement.response,
            });
        }

        Ok(results)
    }

    fn select_requests(&self, collection: &Collection) -> Result<Vec<usize>, AppError> {
        if self.config.run_all {
            return Ok((0..collection.file.requests.len()).collect());
        }
        Ok(vec![
            collection.request_index(self.config.request_name.as_deref())?
        ])
    }

    pub fn list_requests(source_path: &Path) -> Result<Vec<RequestInfo>, AppError> {
        let collection = Collection::load(source_path)?;
        let active = collection.file.active_index;
        Ok(collection
            .file
            .requests
            .iter()
            .enumerate()
            .map(|(index, req)| RequestInfo {
                index,
                name: req.name.clone(),
                method: req.method.as_str().to_string(),
                endpoint: req.endpoint.clone(),
                active: index == active,
            })
            .collect())
    }

    /// The request exactly as it would be sent, without sending it.
    pub fn get_request_details(
        source_path: &Path,
        request_name: Option<&str>,
        environment: Option<&str>,
        variables: &[String],
    ) -> Result<RequestDetails, AppError> {
        let collection = Collection::load(source_path)?;
        let overrides = parse_cli_variables(variables);
        let workspace = collection.into_workspace(environment, &overrides)?;

        let index = collection.request_index(request_name)?;
        let mut request: RequestDefinition = workspace.requests.requests()[index].clone();
        request.body_form_data = collection.load_form_data(index)?;

        let prepared = prepare(
            &request,
            workspace.variables.snapshot(),
            workspace.global_headers.snapshot(),
        );
        Ok(RequestDetails {
            name: request.name.clone(),
            method: prepared.method.as_str().to_string(),
            url: prepared.url.clone(),
            body_type: request.body_type.as_str().to_string(),
            use_global_auth: request.use_global_auth,
            headers: prepared
                .headers
                .iter()
                .map(|(k, v)| HeaderEntry::new(k.clone(), v.clone()))
                .collect(),
            body: prepared.body.describe(),
        })
    }

    pub fn list_environments(source_path: &Path) -> Result<Vec<String>, AppError> {
        Ok(Collection::load(source_path)?.environment_names())
    }

    /// Variables after every layer has been applied; a later duplicate hides an earlier one.
    pub fn effective_variables(
        source_path: &Path,
        environment: Option<&str>,
        variables: &[String],
    ) -> Result<Vec<Variable>, AppError> {
        let collection = Collection::load(source_path)?;
        let layered = collection.layered_variables(environment, &parse_cli_variables(variables))?;
        let mut effective: Vec<Variable> = Vec::new();
        for var in layered.into_iter().filter(|v| !v.key.is_empty()) {
            if let Some(existing) = effective.iter_mut().find(|e| e.key == var.key) {
                existing.value = var.value;
            } else {
                effective.push(var);
            }
        }
        Ok(effective)
    }

    pub fn list_global_headers(source_path: &Path) -> Result<Vec<HeaderEntry>, AppError> {
        Ok(Collection::load(source_path)?.file.global_headers)
    }
}

fn lock(workspace: &Mutex<Workspace>) -> Result<MutexGuard<'_, Workspace>, StoreError> {
    workspace.lock().map_err(|_| StoreError::Poisoned)
}

/// `NAME=VALUE` pairs; arguments are validated by clap before they get here.
fn parse_cli_variables(raw: &[String]) -> Vec<Variable> {
    raw.iter()
        .filter_map(|kv| match kv.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Some(Variable::new(name.trim(), value))
            }
            _ => {
                eprintln!("Ignoring CLI variable without a name: {kv}");
                None
            }
        })
        .collect()
}
