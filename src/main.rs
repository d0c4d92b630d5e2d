mod app;
mod app_builder;
mod engine;
mod pieces;
mod stage;

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        app_builder::start();
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        eprintln!("kakera runs on wasm32 targets only");
    }
}
