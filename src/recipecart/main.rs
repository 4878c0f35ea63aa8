use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use recipecart::api::EntityCommander;
use recipecart::commands::create_recipe::CreatedRecipe;
use recipecart::commands::shopping::ShoppingList;
use recipecart::commands::{CmdMessage, Command, MessageLevel};
use recipecart::config::RecipeCartConfig;
use recipecart::error::{RecipeCartError, Result};
use recipecart::form::RecipeForm;
use recipecart::model::{Ingredient, Recipe, Tag, User};
use recipecart::store::fs::FileStore;
use recipecart::store::mock;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod args;
use args::{Cli, Commands, KindArg};

const HOME_ENV: &str = "RECIPECART_HOME";

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

struct AppContext {
    api: EntityCommander,
    store: Arc<FileStore>,
    entity_path: PathBuf,
    final_save: bool,
}

/// Returns whether the command was successful.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = init_context(&cli)?;

    let successful = match cli.command {
        Commands::CreateTag { name } => handle_create_tag(&ctx, name),
        Commands::CreateIngredient { name, units, image } => {
            handle_create_ingredient(&ctx, name, units, image)
        }
        Commands::CreateUser { username, email } => handle_create_user(&ctx, username, email),
        Commands::CreateRecipe {
            presentation_name,
            author,
            name,
            tags,
            ingredients,
            directions,
            prep_time,
            cook_time,
            servings,
            image,
        } => {
            let mut form = RecipeForm::new(presentation_name, author)
                .with_tag_names(tags)
                .with_directions(directions);
            for (ingredient, qty) in ingredients {
                form = form.with_ingredient(ingredient, qty);
            }
            if let Some(name) = name {
                form = form.with_name(name);
            }
            form.prep_time = prep_time;
            form.cook_time = cook_time;
            form.num_servings = servings;
            form.image_uri = image;
            handle_create_recipe(&ctx, form)
        }
        Commands::Get { kind, name } => handle_get(&ctx, kind, &name),
        Commands::Search { kind, terms } => handle_search(&ctx, kind, &terms),
        Commands::Bookmark { username, recipe } => handle_bookmark(&ctx, &username, &recipe),
        Commands::Shop {
            username,
            ingredients,
        } => handle_shop(&ctx, &username, &ingredients),
        Commands::ShopRecipe {
            username,
            recipe,
            missing_only,
        } => handle_shop_recipe(&ctx, &username, &recipe, missing_only),
        Commands::Save => handle_save(&ctx),
    }?;

    if ctx.final_save {
        ctx.store.save(&ctx.entity_path)?;
    }
    Ok(successful)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    let proj_dirs = ProjectDirs::from("com", "recipecart", "recipecart").ok_or_else(|| {
        RecipeCartError::InvalidArgument(format!(
            "could not determine a data directory; set {}",
            HOME_ENV
        ))
    })?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = data_dir()?;
    let mut config = RecipeCartConfig::load(&data_dir)?;
    if let Some(filename) = &cli.filename {
        config.filename = filename.clone();
    }
    if let Some(n) = cli.updates_per_autosave {
        config.updates_per_autosave = n;
    }
    config.disable_final_save |= cli.disable_final_save;
    config.mock_data |= cli.mock_data;

    let entity_path = config.entity_path(&data_dir);
    tracing::debug!(
        data_dir = %data_dir.display(),
        entity_path = %entity_path.display(),
        updates_per_autosave = config.updates_per_autosave,
        "starting"
    );

    let store = Arc::new(FileStore::with_autosave(
        entity_path.clone(),
        config.updates_per_autosave,
    ));
    store.load_if_exists(&entity_path)?;
    if config.mock_data {
        mock::populate(store.as_ref())?;
    }

    Ok(AppContext {
        api: EntityCommander::new(store.clone()),
        store,
        entity_path,
        final_save: !config.disable_final_save,
    })
}

fn handle_create_tag(ctx: &AppContext, name: String) -> Result<bool> {
    let command = ctx.api.create_tag(Tag::new(name))?;
    report(&command)
}

fn handle_create_ingredient(
    ctx: &AppContext,
    name: String,
    units: Option<String>,
    image: Option<String>,
) -> Result<bool> {
    let mut ingredient = Ingredient::new(name);
    ingredient.units = units;
    ingredient.image_uri = image;
    let command = ctx.api.create_ingredient(ingredient)?;
    report(&command)
}

fn handle_create_user(ctx: &AppContext, username: String, email: Option<String>) -> Result<bool> {
    let mut user = User::new(username);
    user.email_address = email;
    let command = ctx.api.create_user(user)?;
    report(&command)
}

fn handle_create_recipe(ctx: &AppContext, form: RecipeForm) -> Result<bool> {
    let command = ctx.api.create_recipe(form)?;
    let successful = report(&command)?;
    if let Some(created) = command.output()? {
        print_created_recipe(created);
    }
    Ok(successful)
}

fn handle_get(ctx: &AppContext, kind: KindArg, name: &str) -> Result<bool> {
    match kind {
        KindArg::Tag => {
            let command = ctx.api.get_tag(name)?;
            report_with(&command, command.output()?, |tag| println!("{}", tag))
        }
        KindArg::Ingredient => {
            let command = ctx.api.get_ingredient(name)?;
            report_with(&command, command.output()?, |i| println!("{}", i))
        }
        KindArg::Recipe => {
            let command = ctx.api.get_recipe(name)?;
            report_with(&command, command.output()?, print_recipe)
        }
        KindArg::User => {
            let command = ctx.api.get_user(name)?;
            report_with(&command, command.output()?, print_user)
        }
    }
}

fn handle_search(ctx: &AppContext, kind: KindArg, terms: &[String]) -> Result<bool> {
    match kind {
        KindArg::Tag => {
            let command = ctx.api.search_tags(terms)?;
            report_with(&command, command.output()?, |found| print_lines(found))
        }
        KindArg::Ingredient => {
            let command = ctx.api.search_ingredients(terms)?;
            report_with(&command, command.output()?, |found| print_lines(found))
        }
        KindArg::Recipe => {
            let command = ctx.api.search_recipes(terms)?;
            report_with(&command, command.output()?, |found| print_lines(found))
        }
        KindArg::User => {
            let command = ctx.api.search_users(terms)?;
            report_with(&command, command.output()?, |found| print_lines(found))
        }
    }
}

fn handle_bookmark(ctx: &AppContext, username: &str, recipe: &str) -> Result<bool> {
    let command = ctx.api.bookmark_recipe(username, recipe)?;
    report_with(&command, command.output()?, |user| {
        println!("{}", "Saved recipes:".bold());
        print_lines(&user.saved_recipes);
    })
}

fn handle_shop(ctx: &AppContext, username: &str, ingredients: &[(String, f64)]) -> Result<bool> {
    let command = ctx
        .api
        .add_ingredients_to_shopping_list(username, ingredients)?;
    report_with(&command, command.output()?, print_shopping_list)
}

fn handle_shop_recipe(
    ctx: &AppContext,
    username: &str,
    recipe: &str,
    missing_only: bool,
) -> Result<bool> {
    let command = ctx
        .api
        .add_recipe_to_shopping_list(username, recipe, missing_only)?;
    report_with(&command, command.output()?, print_shopping_list)
}

fn handle_save(ctx: &AppContext) -> Result<bool> {
    ctx.store.save(&ctx.entity_path)?;
    print_messages(&[CmdMessage::success(format!(
        "Saved entities to {}",
        ctx.entity_path.display()
    ))]);
    Ok(true)
}

fn report(command: &dyn Command) -> Result<bool> {
    print_messages(&[command.report()?]);
    command.is_successful()
}

fn report_with<T>(
    command: &dyn Command,
    output: Option<&T>,
    print: impl FnOnce(&T),
) -> Result<bool> {
    let successful = report(command)?;
    if let Some(output) = output {
        print(output);
    }
    Ok(successful)
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_lines<T: Display>(items: &[T]) {
    for item in items {
        println!("  {}", item);
    }
}

fn print_created_recipe(created: &CreatedRecipe) {
    let mut messages = Vec::new();
    if let Some(name) = &created.recipe.name {
        messages.push(CmdMessage::info(format!("Recipe name: {}", name)));
    }
    if !created.created_tags.is_empty() {
        let tags: Vec<String> = created.created_tags.iter().map(Tag::to_string).collect();
        messages.push(CmdMessage::info(format!(
            "Created tags: {}",
            tags.join(", ")
        )));
    }
    print_messages(&messages);
}

fn print_recipe(recipe: &Recipe) {
    println!(
        "{} {}",
        recipe.name.as_deref().unwrap_or_default().yellow(),
        recipe.presentation_name.as_deref().unwrap_or_default().bold()
    );
    if let Some(author) = &recipe.author_username {
        println!("  by {}", author);
    }
    let details = [
        ("prep", recipe.prep_time),
        ("cook", recipe.cook_time),
        ("servings", recipe.num_servings),
    ];
    for (label, value) in details {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    }
    if recipe.num_ratings > 0 {
        println!(
            "  rating: {} ({} ratings)",
            recipe.avg_rating, recipe.num_ratings
        );
    }
    if !recipe.tags.is_empty() {
        let tags: Vec<String> = recipe.tags.iter().map(Tag::to_string).collect();
        println!("  tags: {}", tags.join(", "));
    }
    if !recipe.required_ingredients.is_empty() {
        println!("{}", "Ingredients:".bold());
        print_shopping_list(&recipe.required_ingredients);
    }
    if !recipe.directions.is_empty() {
        println!("{}", "Directions:".bold());
        for (i, step) in recipe.directions.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }
}

fn print_user(user: &User) {
    println!("{}", user.to_string().bold());
    let sections = [
        ("Authored recipes:", &user.authored_recipes),
        ("Saved recipes:", &user.saved_recipes),
    ];
    for (title, recipes) in sections {
        if !recipes.is_empty() {
            println!("{}", title);
            print_lines(recipes);
        }
    }
    if !user.owned_ingredients.is_empty() {
        println!("Owned ingredients:");
        for ingredient in &user.owned_ingredients {
            println!("  {}", ingredient);
        }
    }
    if !user.shopping_list.is_empty() {
        println!("Shopping list:");
        print_shopping_list(&user.shopping_list);
    }
}

fn print_shopping_list(list: &ShoppingList) {
    for (ingredient, amount) in list {
        println!("  {} {}", amount.to_string().yellow(), ingredient);
    }
}
