mod config;
mod error;
mod library;
mod pipeline;
mod runtime;
mod session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
