use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};

pub use app_error::{AppError, AppResult};
pub use body::read_json;
pub use query_params::{ParseParamError, QueryParams};
pub use response::respond_with_json;

pub mod date_serde;

mod app_error;
mod body;
mod command;
mod query_params;
mod response;

pub type HttpRequest = Request<Incoming>;

pub type HttpResponse = Response<Full<Bytes>>;
