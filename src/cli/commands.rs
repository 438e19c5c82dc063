use crate::cli::{Command, CommandError, State};
use crate::db;
use crate::db::feed_follows;
use crate::db::feeds;
use crate::db::posts;
use crate::db::users;
use crate::models::user::User;
use crate::sync::reader::RssReader;
use crate::sync::scheduler::PollScheduler;
use crate::sync::store::DbStore;
use log::info;

const DEFAULT_BROWSE_LIMIT: i64 = 2;

pub fn login(state: &mut State, command: Command) -> Result<(), CommandError> {
    let [name] = exact_args::<1>(&command)?;

    let mut connection = db::pool().get()?;

    let user = users::find_by_name(&mut connection, &name)
        .ok_or_else(|| CommandError::NotFound(format!("user {name} does not exist")))?;

    state
        .config
        .set_user(&user.name)
        .map_err(|err| CommandError::Config { msg: err.msg })?;

    println!("User switched successfully!");

    Ok(())
}

pub fn register(state: &mut State, command: Command) -> Result<(), CommandError> {
    let [name] = exact_args::<1>(&command)?;

    let mut connection = db::pool().get()?;

    let user = users::create(&mut connection, name)?;

    state
        .config
        .set_user(&user.name)
        .map_err(|err| CommandError::Config { msg: err.msg })?;

    println!("User created and set successfully: {}", user.name);

    Ok(())
}

pub fn reset(_state: &mut State, _command: Command) -> Result<(), CommandError> {
    let mut connection = db::pool().get()?;

    users::delete_all(&mut connection)?;

    println!("Users deleted successfully");

    Ok(())
}

pub fn users(state: &mut State, _command: Command) -> Result<(), CommandError> {
    let mut connection = db::pool().get()?;

    let all_users = users::all(&mut connection)?;
    let current_user = &state.config.current_user_name;

    for user in all_users {
        if &user.name == current_user {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }

    Ok(())
}

pub fn agg(_state: &mut State, command: Command) -> Result<(), CommandError> {
    let [interval_string] = exact_args::<1>(&command)?;

    // A malformed interval is a fatal configuration error; the loop never
    // starts and no network or store call happens
    let scheduler = PollScheduler::new(&interval_string)
        .map_err(|err| CommandError::Config { msg: err.msg })?;

    info!("Collecting feeds every {interval_string}...");

    let mut store = DbStore::new();
    let reader = RssReader::new();

    scheduler.start(&mut store, &reader);

    Ok(())
}

pub fn add_feed(_state: &mut State, command: Command, user: User) -> Result<(), CommandError> {
    let [name, link] = exact_args::<2>(&command)?;

    let mut connection = db::pool().get()?;

    let feed = feeds::create(&mut connection, name, link, user.id)?;
    feed_follows::create(&mut connection, user.id, feed.id)?;

    println!("{} started following {} feed", user.name, feed.name);

    Ok(())
}

pub fn feeds(_state: &mut State, _command: Command) -> Result<(), CommandError> {
    let mut connection = db::pool().get()?;

    for (feed, owner_name) in feeds::all_with_owners(&mut connection)? {
        println!("* {} ({}) added by {}", feed.name, feed.link, owner_name);
    }

    Ok(())
}

pub fn follow(_state: &mut State, command: Command, user: User) -> Result<(), CommandError> {
    let [link] = exact_args::<1>(&command)?;

    let mut connection = db::pool().get()?;

    let feed = feeds::find_by_link(&mut connection, &link)
        .ok_or_else(|| CommandError::NotFound(format!("feed {link} does not exist")))?;

    feed_follows::create(&mut connection, user.id, feed.id)?;

    println!("{} started following {} feed", user.name, feed.name);

    Ok(())
}

pub fn following(_state: &mut State, _command: Command, user: User) -> Result<(), CommandError> {
    let mut connection = db::pool().get()?;

    println!("{} is following:", user.name);

    for feed in feed_follows::feeds_for_user(&mut connection, user.id)? {
        println!("- {}", feed.name);
    }

    Ok(())
}

pub fn unfollow(_state: &mut State, command: Command, user: User) -> Result<(), CommandError> {
    let [link] = exact_args::<1>(&command)?;

    let mut connection = db::pool().get()?;

    let feed = feeds::find_by_link(&mut connection, &link)
        .ok_or_else(|| CommandError::NotFound(format!("feed {link} does not exist")))?;

    feed_follows::delete(&mut connection, user.id, feed.id)?;

    println!("{} stopped following {} feed", user.name, feed.name);

    Ok(())
}

pub fn browse(_state: &mut State, command: Command, user: User) -> Result<(), CommandError> {
    let limit = match command.args.first() {
        None => DEFAULT_BROWSE_LIMIT,
        Some(raw_limit) => raw_limit
            .parse::<i64>()
            .map_err(|err| CommandError::Usage(format!("invalid limit: {err}")))?,
    };

    let mut connection = db::pool().get()?;

    let found_posts = posts::find_for_user(&mut connection, user.id, limit)?;

    println!("Found {} posts for user {}:", found_posts.len(), user.name);

    for (post, feed_name) in found_posts {
        let published_on = post
            .published_at
            .map(|date| date.format("%a %b %e").to_string())
            .unwrap_or_else(|| "unknown date".to_string());

        println!("{published_on} from {feed_name}");
        println!("--- {} ---", post.title);
        println!("Desc: {}", post.description.unwrap_or_default());
        println!("Link: {}", post.link);
        println!("=====================================");
    }

    Ok(())
}

fn exact_args<const N: usize>(command: &Command) -> Result<[String; N], CommandError> {
    let args: [String; N] = command
        .args
        .clone()
        .try_into()
        .map_err(|_| CommandError::Usage(usage_for(&command.name)))?;

    Ok(args)
}

fn usage_for(name: &str) -> String {
    let usage = match name {
        "login" => "login <name>",
        "register" => "register <name>",
        "agg" => "agg <time_between_reqs>",
        "addfeed" => "addfeed <name> <url>",
        "follow" => "follow <url>",
        "unfollow" => "unfollow <url>",
        _ => name,
    };

    format!("usage: {usage}")
}
