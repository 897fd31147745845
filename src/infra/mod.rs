pub mod content_api_adapter;
pub mod draft_store_adapter;
pub mod http_client;
pub mod validator_adapter;
