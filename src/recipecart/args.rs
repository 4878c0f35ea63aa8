use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "recipecart", version)]
#[command(about = "Recipes, pantries and shopping lists from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Entity file to load and save (relative to the data directory)
    #[arg(short, long, global = true)]
    pub filename: Option<String>,

    /// Autosave after this many updates (0 disables autosave)
    #[arg(short, long, global = true)]
    pub updates_per_autosave: Option<u32>,

    /// Do not save the entity file on exit
    #[arg(short, long, global = true)]
    pub disable_final_save: bool,

    /// Load the demo dataset before running the command
    #[arg(short, long, global = true)]
    pub mock_data: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Tag,
    Ingredient,
    Recipe,
    User,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new tag
    CreateTag { name: String },

    /// Create a new ingredient
    CreateIngredient {
        name: String,

        /// Units the ingredient is measured in (e.g. g, ml, cups)
        #[arg(long)]
        units: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },

    /// Create a new user
    CreateUser {
        username: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Create a recipe; missing tags are created, ingredients must exist
    CreateRecipe {
        /// Display name of the recipe
        presentation_name: String,

        /// Username of the author
        author: String,

        /// Unique recipe name (derived from the presentation name if omitted)
        #[arg(long)]
        name: Option<String>,

        /// Tag name (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Required ingredient as NAME=QTY (repeatable)
        #[arg(long = "ingredient", value_parser = parse_quantity)]
        ingredients: Vec<(String, f64)>,

        /// Direction step (repeatable, in order)
        #[arg(long = "direction")]
        directions: Vec<String>,

        /// Preparation time in minutes
        #[arg(long)]
        prep_time: Option<u32>,

        /// Cooking time in minutes
        #[arg(long)]
        cook_time: Option<u32>,

        #[arg(long)]
        servings: Option<u32>,

        #[arg(long)]
        image: Option<String>,
    },

    /// Show one entity by name
    Get {
        #[arg(value_enum)]
        kind: KindArg,
        name: String,
    },

    /// Search entities by case-insensitive tokens
    Search {
        #[arg(value_enum)]
        kind: KindArg,

        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
    },

    /// Add a recipe to a user's saved recipes
    Bookmark { username: String, recipe: String },

    /// Add ingredients to a user's shopping list
    Shop {
        username: String,

        /// Ingredient as NAME=QTY (repeatable)
        #[arg(long = "ingredient", required = true, value_parser = parse_quantity)]
        ingredients: Vec<(String, f64)>,
    },

    /// Add a recipe's ingredients to a user's shopping list
    ShopRecipe {
        username: String,
        recipe: String,

        /// Skip ingredients the user already owns
        #[arg(long)]
        missing_only: bool,
    },

    /// Save the entity file and exit
    Save,
}

/// Parses `NAME=QTY`. The last `=` splits, so names may contain `=`.
pub fn parse_quantity(raw: &str) -> Result<(String, f64), String> {
    let (name, qty) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got '{}'", raw))?;
    let qty: f64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", qty))?;
    if !qty.is_finite() {
        return Err(format!("'{}' is not a finite quantity", raw));
    }
    Ok((name.trim().to_string(), qty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("Eggs=3"), Ok(("Eggs".to_string(), 3.0)));
        assert_eq!(
            parse_quantity("Brown Sugar = 0.5"),
            Ok(("Brown Sugar".to_string(), 0.5))
        );
        assert_eq!(parse_quantity("a=b=2"), Ok(("a=b".to_string(), 2.0)));
        assert!(parse_quantity("Eggs").is_err());
        assert!(parse_quantity("Eggs=lots").is_err());
        assert!(parse_quantity("Eggs=inf").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "recipecart",
            "create-tag",
            "vegan",
            "-u",
            "0",
            "--disable-final-save",
        ])
        .unwrap();
        assert_eq!(cli.updates_per_autosave, Some(0));
        assert!(cli.disable_final_save);
        assert!(matches!(cli.command, Commands::CreateTag { ref name } if name == "vegan"));
    }

    #[test]
    fn test_create_recipe_args() {
        let cli = Cli::try_parse_from([
            "recipecart",
            "create-recipe",
            "Tomato soup",
            "ann",
            "--tag",
            "vegan",
            "--tag",
            "soup",
            "--ingredient",
            "Tomato=4",
            "--direction",
            "Chop",
            "--direction",
            "Simmer",
            "--cook-time",
            "30",
        ])
        .unwrap();

        match cli.command {
            Commands::CreateRecipe {
                presentation_name,
                author,
                name,
                tags,
                ingredients,
                directions,
                cook_time,
                ..
            } => {
                assert_eq!(presentation_name, "Tomato soup");
                assert_eq!(author, "ann");
                assert_eq!(name, None);
                assert_eq!(tags, vec!["vegan", "soup"]);
                assert_eq!(ingredients, vec![("Tomato".to_string(), 4.0)]);
                assert_eq!(directions, vec!["Chop", "Simmer"]);
                assert_eq!(cook_time, Some(30));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_terms() {
        assert!(Cli::try_parse_from(["recipecart", "search", "recipe"]).is_err());
        let cli = Cli::try_parse_from(["recipecart", "search", "recipe", "x", "y"]).unwrap();
        match cli.command {
            Commands::Search { kind, terms } => {
                assert_eq!(kind, KindArg::Recipe);
                assert_eq!(terms, vec!["x", "y"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
