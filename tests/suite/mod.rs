mod config_file;
mod verification;
mod visual_session;
