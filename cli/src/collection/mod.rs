//! Collection files: the JSON document a user keeps variables, global headers and requests in.

pub mod secrets;

use crate::core::error::AppError;
use crate::core::paths::{clean_path, relative_to};
use reqpad_lib::debug_log;
use reqpad_lib::{
    BodyType, FilePayload, FormRow, FormRowKind, FormValue, GlobalHeaderStore, HeaderEntry,
    HttpMethod, RequestDefinition, RequestStore, Variable, VariableStore, Workspace,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_NAME: &str = "reqpad.json";

/// Free-form text fields may be written either as a string or as inline JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextOrJson {
    Text(String),
    Json(Value),
}

impl TextOrJson {
    pub fn into_text(self) -> String {
        match self {
            TextOrJson::Text(text) => text,
            TextOrJson::Json(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormRowFile {
    #[serde(default)]
    pub key: String,
    /// Text value, or for `file` rows a path relative to the collection.
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "type")]
    pub kind: FormRowKind,
}

fn default_true() -> bool {
    true
}

fn default_request_name() -> String {
    RequestDefinition::DEFAULT_NAME.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFile {
    #[serde(default = "default_request_name")]
    pub name: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub body_type: BodyType,
    pub headers: Option<TextOrJson>,
    #[serde(default = "default_true")]
    pub use_global_auth: bool,
    pub body_json: Option<TextOrJson>,
    pub body_form_data: Option<Vec<FormRowFile>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFile {
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub global_headers: Vec<HeaderEntry>,
    #[serde(default)]
    pub environments: BTreeMap<String, Vec<Variable>>,
    #[serde(default)]
    pub active_index: usize,
    #[serde(default)]
    pub requests: Vec<RequestFile>,
}

/// A parsed collection plus where it came from.
#[derive(Debug, Clone)]
pub struct Collection {
    pub path: PathBuf,
    pub file: CollectionFile,
}

impl Collection {
    /// `source` is either a collection file or a directory holding `reqpad.json`.
    pub fn load(source: &Path) -> Result<Self, AppError> {
        let path = if source.is_dir() {
            source.join(DEFAULT_FILE_NAME)
        } else {
            source.to_path_buf()
        };
        if !path.is_file() {
            return Err(AppError::CollectionNotFound(clean_path(&path)));
        }
        debug_log!("Loading collection {}", clean_path(&path));
        let content = fs::read_to_string(&path)?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: PathBuf) -> Result<Self, AppError> {
        let file: CollectionFile = serde_json::from_str(content)?;
        if file.requests.is_empty() {
            return Err(AppError::Validation(
                "collection must contain at least one request".to_string(),
            ));
        }
        if file.active_index >= file.requests.len() {
            return Err(AppError::Validation(format!(
                "activeIndex {} is out of range for {} request(s)",
                file.active_index,
                file.requests.len()
            )));
        }
        Ok(Self { path, file })
    }

    pub fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn environment_names(&self) -> Vec<String> {
        self.file.environments.keys().cloned().collect()
    }

    /// Variables in shadowing order: collection, environment, `.env`, OS, then `overrides`.
    pub fn layered_variables(
        &self,
        environment: Option<&str>,
        overrides: &[Variable],
    ) -> Result<Vec<Variable>, AppError> {
        let mut variables = self.file.variables.clone();
        if let Some(env_name) = environment {
            let env_vars = self
                .file
                .environments
                .get(env_name)
                .ok_or_else(|| AppError::EnvironmentNotFound(env_name.to_string()))?;
            variables.extend(env_vars.iter().cloned());
        }
        variables.extend(secrets::load_secrets(&self.dir(), environment)?);
        variables.extend(overrides.iter().cloned());
        Ok(variables)
    }

    /// With `load_files` unset, file rows stay unchosen and nothing is read from disk.
    fn form_row(&self, row: &FormRowFile, load_files: bool) -> Result<FormRow, AppError> {
        let value = match row.kind {
            FormRowKind::Text => FormValue::Text(row.value.clone()),
            FormRowKind::File if row.value.is_empty() || !load_files => FormValue::File(None),
            FormRowKind::File => {
                let path = relative_to(&self.dir(), &row.value);
                let bytes = fs::read(&path).map_err(|source| AppError::FileSource {
                    path: clean_path(&path),
                    source,
                })?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| row.value.clone());
                FormValue::File(Some(FilePayload::new(filename, bytes)))
            }
        };
        Ok(FormRow {
            key: row.key.clone(),
            value,
        })
    }

    fn form_rows(&self, req: &RequestFile, load_files: bool) -> Result<Vec<FormRow>, AppError> {
        match &req.body_form_data {
            Some(rows) => rows
                .iter()
                .map(|row| self.form_row(row, load_files))
                .collect(),
            None => Ok(vec![FormRow::default()]),
        }
    }

    /// Form rows of the request at `index` with their file payloads read, for sending it.
    ///
    /// Files are only read when the request will actually carry a form body.
    pub fn load_form_data(&self, index: usize) -> Result<Vec<FormRow>, AppError> {
        let req = self
            .file
            .requests
            .get(index)
            .ok_or_else(|| AppError::Validation(format!("no request at index {index}")))?;
        let sends_form = req.method.allows_body()
            && matches!(req.body_type, BodyType::UrlEncoded | BodyType::Multipart);
        self.form_rows(req, sends_form)
    }

    /// Position of the request called `name`, or the active one when no name is given.
    pub fn request_index(&self, name: Option<&str>) -> Result<usize, AppError> {
        match name {
            Some(name) => self
                .file
                .requests
                .iter()
                .position(|req| req.name == name)
                .ok_or_else(|| AppError::RequestNotFound(name.to_string())),
            None => Ok(self.file.active_index),
        }
    }

    /// Definitions as stored; file rows are left unchosen until [`Self::load_form_data`].
    fn definition(&self, req: &RequestFile) -> Result<RequestDefinition, AppError> {
        let body_form_data = self.form_rows(req, false)?;
        Ok(RequestDefinition {
            name: req.name.clone(),
            endpoint: req.endpoint.clone(),
            method: req.method,
            body_type: req.body_type,
            headers: req
                .headers
                .clone()
                .map(TextOrJson::into_text)
                .unwrap_or_else(|| "{}".to_string()),
            use_global_auth: req.use_global_auth,
            body_json: req
                .body_json
                .clone()
                .map(TextOrJson::into_text)
                .unwrap_or_else(|| "{}".to_string()),
            body_form_data,
            ..RequestDefinition::new_default()
        })
    }

    pub fn request_definitions(&self) -> Result<Vec<RequestDefinition>, AppError> {
        self.file
            .requests
            .iter()
            .map(|req| self.definition(req))
            .collect()
    }

    pub fn into_workspace(
        &self,
        environment: Option<&str>,
        overrides: &[Variable],
    ) -> Result<Workspace, AppError> {
        let mut requests = RequestStore::new(self.request_definitions()?)?;
        requests.select(self.file.active_index)?;
        Ok(Workspace {
            variables: VariableStore::new(self.layered_variables(environment, overrides)?),
            global_headers: GlobalHeaderStore::new(self.file.global_headers.clone()),
            requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "variables": [{"key": "baseUrl", "value": "https://jsonplaceholder.typicode.com"}],
        "globalHeaders": [{"key": "Authorization", "value": "Bearer YOUR_TOKEN"}],
        "environments": {"local": [{"key": "baseUrl", "value": "http://localhost:8080"}]},
        "requests": [
            {"name": "Get User Data", "endpoint": "/users/{{userId}}"},
            {
                "name": "Create",
                "method": "POST",
                "bodyType": "application/json",
                "headers": {"Content-Type": "application/json"},
                "bodyJson": {"title": "hello"},
                "useGlobalAuth": false
            }
        ]
    }"#;

    fn sample() -> Collection {
        Collection::parse(SAMPLE, PathBuf::from("/nonexistent/reqpad.json")).unwrap()
    }

    #[test]
    fn test_parse_applies_request_defaults() {
        let defs = sample().request_definitions().unwrap();
        let first = &defs[0];
        assert_eq!(first.method, HttpMethod::GET);
        assert_eq!(first.body_type, BodyType::None);
        assert_eq!(first.headers, "{}");
        assert_eq!(first.body_json, "{}");
        assert!(first.use_global_auth);
        assert_eq!(first.body_form_data, vec![FormRow::default()]);
    }

    #[test]
    fn test_inline_json_fields_become_text() {
        let defs = sample().request_definitions().unwrap();
        let create = &defs[1];
        assert_eq!(create.headers, "{\n  \"Content-Type\": \"application/json\"\n}");
        assert_eq!(create.body_json, "{\n  \"title\": \"hello\"\n}");
        assert!(!create.use_global_auth);
    }

    #[test]
    fn test_empty_request_list_is_rejected() {
        let result = Collection::parse(r#"{"requests": []}"#, PathBuf::from("x.json"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_active_index_out_of_range_is_rejected() {
        let result = Collection::parse(
            r#"{"activeIndex": 2, "requests": [{"name": "a"}]}"#,
            PathBuf::from("x.json"),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_environment_shadows_collection_variables() {
        let vars = sample()
            .layered_variables(Some("local"), &[Variable::new("userId", "7")])
            .unwrap();
        let table = reqpad_lib::VariableTable::from_variables(&vars);
        assert_eq!(table.get("baseUrl"), Some("http://localhost:8080"));
        assert_eq!(table.get("userId"), Some("7"));
    }

    #[test]
    fn test_unknown_environment() {
        let result = sample().layered_variables(Some("prod"), &[]);
        assert!(matches!(result, Err(AppError::EnvironmentNotFound(name)) if name == "prod"));
    }

    #[test]
    fn test_missing_form_file_is_reported_on_load() {
        let collection = Collection::parse(
            r#"{"requests": [{"name": "Upload", "method": "POST", "bodyType": "multipart/form-data",
                "bodyFormData": [{"key": "doc", "value": "missing.bin", "type": "file"}]}]}"#,
            PathBuf::from("/nonexistent/reqpad.json"),
        )
        .unwrap();
        let defs = collection.request_definitions().unwrap();
        assert_eq!(defs[0].body_form_data[0].value, FormValue::File(None));

        let result = collection.load_form_data(0);
        assert!(matches!(result, Err(AppError::FileSource { .. })));
    }

    #[test]
    fn test_file_rows_unread_when_no_form_body_is_sent() {
        let collection = Collection::parse(
            r#"{"requests": [
                {"name": "Fetch", "method": "GET", "bodyType": "multipart/form-data",
                 "bodyFormData": [{"key": "doc", "value": "missing.bin", "type": "file"}]},
                {"name": "Post Json", "method": "POST", "bodyType": "application/json",
                 "bodyFormData": [{"key": "doc", "value": "missing.bin", "type": "file"}]}
            ]}"#,
            PathBuf::from("/nonexistent/reqpad.json"),
        )
        .unwrap();
        for index in 0..2 {
            let rows = collection.load_form_data(index).unwrap();
            assert_eq!(rows[0].value, FormValue::File(None));
        }
        assert!(matches!(
            collection.load_form_data(2),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_request_index_by_name_or_active() {
        let collection = Collection::parse(
            r#"{"activeIndex": 1, "requests": [{"name": "A"}, {"name": "B"}]}"#,
            PathBuf::from("x.json"),
        )
        .unwrap();
        assert_eq!(collection.request_index(Some("A")).unwrap(), 0);
        assert_eq!(collection.request_index(None).unwrap(), 1);
        assert!(matches!(
            collection.request_index(Some("C")),
            Err(AppError::RequestNotFound(name)) if name == "C"
        ));
    }

    #[test]
    fn test_file_row_without_path_is_unchosen() {
        let collection = Collection::parse(
            r#"{"requests": [{"name": "Upload", "bodyFormData": [{"key": "doc", "type": "file"}]}]}"#,
            PathBuf::from("x.json"),
        )
        .unwrap();
        let defs = collection.request_definitions().unwrap();
        assert_eq!(defs[0].body_form_data[0].value, FormValue::File(None));
    }
}
