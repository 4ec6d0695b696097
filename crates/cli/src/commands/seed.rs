//! Seed a demo catalog and accounts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;

use quince_commerce::services::{
    AccountService, CatalogService, CreateCategory, CreateProduct, LogMailer, RegisterAccount,
};
use quince_commerce::{CommerceConfig, Store};
use quince_core::{CategoryId, Email};

/// Demo products: (name, sku, price, stock).
const PRODUCTS: &[(&str, &str, &str, u32)] = &[
    ("Walnut Writing Desk", "DESK-001", "349.00", 12),
    ("Oak Side Chair", "CHAIR-001", "89.00", 40),
    ("Brass Desk Lamp", "LAMP-001", "59.50", 25),
    ("Wool Throw Blanket", "BLANKET-001", "45.00", 8),
];

/// Seed a store with demo data and log what was created.
///
/// # Errors
///
/// Returns the underlying commerce error if any creation step fails.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new();
    let config = CommerceConfig::default();

    let summary = seed(&store, &config)?;
    tracing::info!(
        categories = summary.categories,
        products = summary.products,
        users = summary.users,
        "demo data seeded"
    );
    Ok(())
}

/// What [`seed`] created.
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub users: usize,
}

/// Seed demo categories, products and a customer account into a store.
///
/// # Errors
///
/// Returns the underlying commerce error if any creation step fails.
pub fn seed(
    store: &Store,
    config: &CommerceConfig,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let mailer = LogMailer;
    let catalog = CatalogService::new(store, config);
    let accounts = AccountService::new(store, config, &mailer);

    let furniture = catalog.create_category(CreateCategory {
        name: "Furniture".to_owned(),
        description: Some("Desks, chairs and tables".to_owned()),
        slug: "furniture".to_owned(),
        image_url: None,
        sort_order: Some(0),
        parent_id: None,
    })?;
    let home = catalog.create_category(CreateCategory {
        name: "Home".to_owned(),
        description: Some("Lighting and textiles".to_owned()),
        slug: "home".to_owned(),
        image_url: None,
        sort_order: Some(1),
        parent_id: None,
    })?;

    let mut products = 0;
    for (index, (name, sku, price, stock)) in PRODUCTS.iter().enumerate() {
        let category = if index < 2 { furniture.id } else { home.id };
        create_product(&catalog, name, sku, price.parse()?, *stock, category)?;
        products += 1;
    }

    let customer = accounts.register(RegisterAccount {
        username: "demo".to_owned(),
        email: Email::parse("demo@example.com")?,
        password: SecretString::from("demo password 1"),
        first_name: "Demo".to_owned(),
        last_name: "Customer".to_owned(),
        phone_number: None,
    })?;
    accounts.verify_email(customer.id)?;

    Ok(SeedSummary {
        categories: 2,
        products,
        users: 1,
    })
}

fn create_product(
    catalog: &CatalogService<'_>,
    name: &str,
    sku: &str,
    price: Decimal,
    stock: u32,
    category_id: CategoryId,
) -> Result<(), Box<dyn std::error::Error>> {
    catalog.create_product(CreateProduct {
        name: name.to_owned(),
        description: None,
        sku: sku.to_owned(),
        price,
        cost: Some(dec!(0.00)),
        stock_quantity: stock,
        minimum_stock_level: None,
        active: None,
        featured: None,
        status: None,
        weight: None,
        weight_unit: None,
        dimensions: None,
        brand: Some("Quince".to_owned()),
        model: None,
        color: None,
        size: None,
        category_id,
        images: Vec::new(),
    })?;
    Ok(())
}
