//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    use clap::Parser;

    env_logger::init();
    let config = cardsmith_app::AppConfig::parse();

    let result = cardsmith_app::App::new(config).and_then(|mut app| pollster::block_on(app.run()));
    match result {
        Ok(path) => log::info!("Card written to {}", path.display()),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("cardsmith: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
