fn main() {
    if let Err(err) = graph_tidy::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
