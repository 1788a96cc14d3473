//! Request composition and execution engine.
//!
//! The functions here are pure where they can be: variable resolution, header merging,
//! body encoding and URL assembly take snapshots of the caller's state and return new values.
//! Only [`executor::Executor`] talks to the network, through a [`transport::Transport`].

pub mod body;
pub mod content_type;
pub mod executor;
pub mod headers;
pub mod http_method;
pub mod logger;
pub mod request;
pub mod store;
pub mod transport;
pub mod url;
pub mod variables;

pub use body::{
    encode_body, sync_content_type, BodyType, EncodedBody, FilePayload, FormRow, FormRowKind,
    FormValue,
};
pub use executor::{prepare, Executor, RunReport};
pub use headers::{
    compute_effective_headers, toggle_global_auth, EffectiveHeaders, HeaderEntry, ParsedHeaders,
};
pub use http_method::HttpMethod;
pub use request::{
    ExecutionOutcome, RequestDefinition, RequestId, ResponseBody, Settlement, StatusCode,
};
pub use store::{
    ExecutionTicket, GlobalHeaderStore, RequestPatch, RequestStore, StoreError, VariableStore,
    Workspace,
};
pub use transport::{
    PreparedRequest, ReqwestTransport, Transport, TransportError, TransportFuture,
    TransportResponse,
};
pub use url::{assemble_url, join_url};
pub use variables::{resolve, Variable, VariableTable};
