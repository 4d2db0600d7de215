//! Process entrypoint, grounded on the teacher's `node/src/main.rs`.

fn main() -> anyhow::Result<()> {
    tinto_node::logger::init();
    let args = argh::from_env::<tinto_node::cli::Args>();
    args.run()
}
