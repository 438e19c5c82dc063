use dotenv::dotenv;
use feedpoll::cli;
use feedpoll::cli::Command;
use feedpoll::cli::State;
use feedpoll::config::Config;
use feedpoll::db;
use std::env;
use std::process;

fn main() {
    dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("usage: feedpoll <command> [args...]");
        process::exit(1);
    }

    let config = match Config::read() {
        Ok(config) => config,
        Err(error) => {
            log::error!("Couldn't read the config file: {}", error.msg);
            process::exit(1);
        }
    };

    let database_url = match config.database_url() {
        Ok(url) => url,
        Err(error) => {
            log::error!("{}", error.msg);
            process::exit(1);
        }
    };

    db::init_pool(&database_url);

    let registry = cli::registry();
    let mut state = State { config };
    let command = Command {
        name: args[1].clone(),
        args: args[2..].to_vec(),
    };

    if let Err(error) = registry.run(&mut state, command) {
        eprintln!("{error}");
        process::exit(1);
    }
}
