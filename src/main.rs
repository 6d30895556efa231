use tracing_subscriber::EnvFilter;

use rlox::lox::Lox;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    Lox::new().main();
}
