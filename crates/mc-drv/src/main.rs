use std::env;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = mc_drv::run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
