use attendance_api::{Config, build_rocket, ensure_rocket_secret_key, init_tracing};
use rocket::{Build, Rocket};

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let config = Config::load().expect("failed to load configuration");
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_rocket_secret_key();

    build_rocket(config)
}
