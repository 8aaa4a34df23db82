use static_responder::{config::Config, errors::ServerError, logging, server};

fn main() -> Result<(), ServerError> {
    logging::init_logging();

    let config = Config::from_env()?;
    server::run(config)
}
