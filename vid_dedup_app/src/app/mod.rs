mod app_cfg;
mod app_fns;
mod arg_parse;

pub(crate) use app_cfg::*;

pub use app_fns::run_app;
