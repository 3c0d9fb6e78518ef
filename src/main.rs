fn main() {
    if let Err(err) = osu_map_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
