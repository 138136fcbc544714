// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
 _       _                  _
(_)_ __ | |_ ___ _ ____   _(_) _____      __
| | '_ \| __/ _ \ '__\ \ / / |/ _ \ \ /\ / /
| | | | | ||  __/ |   \ V /| |  __/\ V  V /
|_|_| |_|\__\___|_|    \_/ |_|\___| \_/\_/

    Timed Interview Session Controller
"#;
    println!("{}", banner);
}
