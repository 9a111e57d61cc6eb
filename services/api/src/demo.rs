use clap::Args;

use glowplan::catalog::ProductCatalog;
use glowplan::error::AppError;
use glowplan::quiz::QuizAnswers;
use glowplan::routines::domain::RoutineType;
use glowplan::routines::resolver::{resolve, ResolvedProduct};
use glowplan::rules::RuleTable;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skin type answer (oily, dry, combination, normal, sensitive)
    #[arg(long, default_value = "oily")]
    skin_type: String,
    /// Acne severity answer (mild, moderate, severe)
    #[arg(long, default_value = "moderate")]
    severity: String,
    /// Age used for the maturity branch of the rule table
    #[arg(long, default_value_t = 30)]
    age: u8,
    /// Resolve with premium variant recommendations
    #[arg(long)]
    premium: bool,
}

fn print_section(label: &str, products: &[ResolvedProduct]) {
    println!("{label}:");
    for (index, product) in products.iter().enumerate() {
        let brand = if product.brand.is_empty() {
            String::new()
        } else {
            format!("{} ", product.brand)
        };
        println!(
            "  {}. [{}] {}{}",
            index + 1,
            product.category.label(),
            brand,
            product.name
        );
        for option in &product.premium_options {
            println!("     alternative: {} {}", option.brand, option.name);
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = ProductCatalog::standard();
    let rules = RuleTable::standard();

    let answers = QuizAnswers {
        name: "Demo".to_string(),
        age: args.age,
        skin_type: args.skin_type,
        fitzpatrick_group: "1-3".to_string(),
        acne_types: vec!["inflamed".to_string()],
        acne_severity: args.severity,
        is_pregnant_or_nursing: false,
    };
    let profile = answers.profile();

    println!("GlowPlan routine demo");
    println!("=====================");
    println!(
        "profile: skin_type={} severity={} mature={}",
        profile.skin_type, profile.severity, profile.is_mature
    );

    let Some(row) = rules.first_match(&profile) else {
        println!("no rule row matches this profile");
        return Ok(());
    };

    let slot_ids = row.slots.ordered();
    let routine_type = RoutineType::from_profile(&profile);
    println!("routine type: {}", routine_type.label());
    println!(
        "entitlement: {}",
        if args.premium { "premium" } else { "free" }
    );
    println!();

    let resolved = resolve(&catalog, &slot_ids, args.premium);
    print_section("Morning", &resolved.morning);
    println!();
    print_section("Evening", &resolved.evening);

    Ok(())
}
