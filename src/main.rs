use ivory::engine::Engine;
use ivory::uci;

fn main() {
    // Diagnostics go to stderr; stdout carries the UCI protocol
    env_logger::init();

    let mut engine = Engine::new();
    uci::uci_loop(&mut engine);
}
