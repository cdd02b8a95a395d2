use std::sync::Arc;

use log::{error, info};
use serde::Serialize;

use people_facade::{
    params::Configurables,
    repo::{FacadePerson, Repository},
    store::MongoStore,
    types::NewPerson,
};

type BoxError = Box<dyn std::error::Error>;

const SEED: &str = r#"[
    { "name": "Mary", "age": 17, "favoriteFoods": ["burrito", "pizza"] },
    { "name": "Zoe", "age": 33, "favoriteFoods": ["burrito"] },
    { "name": "Ann", "age": 29, "favoriteFoods": ["sushi", "burrito"] },
    { "name": "Mary", "favoriteFoods": ["salad"] }
]"#;

/// Food looked up by the chained query.
const CHAINED_QUERY_FOOD: &str = "burrito";

fn main() -> Result<(), BoxError> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Configurables::from_env()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: Configurables) -> Result<(), BoxError> {
    info!(
        "connecting to {} (database `{}`)",
        config.redacted_uri(),
        config.database
    );

    let store = MongoStore::connect(&config.mongo_uri, &config.database).await?;
    let facade = FacadePerson::new(Repository::new(Arc::new(store)));

    let created = facade.create_one(NewPerson::sample()).await?;
    show("create_one", &created)?;

    let seed: Vec<NewPerson> = serde_json::from_str(SEED)?;
    let people = facade.create_many(seed).await?;
    show("create_many", &people)?;

    show("find_by_name", &facade.find_by_name("Mary").await?)?;
    show("find_one_by_food", &facade.find_one_by_food("sushi").await?)?;
    show("find_by_id", &facade.find_by_id(&created.id).await?)?;
    show("edit_then_save", &facade.edit_then_save(&created.id).await?)?;
    show("find_and_update", &facade.find_and_update("Zoe").await?)?;
    show("remove_by_id", &facade.remove_by_id(&created.id).await?)?;
    show("remove_many", &facade.remove_many().await?)?;
    show(
        "chained_query",
        &facade.chained_query(CHAINED_QUERY_FOOD).await?,
    )?;

    // Removing an already removed person must fail
    if let Err(err) = facade.remove_by_id(&created.id).await {
        error!("remove_by_id of a removed person: {}", err);
    }

    Ok(())
}

fn show<T: Serialize>(operation: &str, value: &T) -> Result<(), BoxError> {
    println!("{}: {}", operation, serde_json::to_string_pretty(value)?);
    Ok(())
}
