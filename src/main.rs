use std::sync::Arc;

use anyhow::{Result, bail};
use book_market::BookMarket;
use book_market::charity;
use book_market::config::Config;
use book_market::filter::{ListingTypeFilter, SortKey};
use book_market::forms::{DonationOffer, DonationRequest, ListingDraft, Notification, ProfileUpdate};
use book_market::query::{CATEGORIES, CONDITIONS};
use book_market::traits::Navigator;
use book_market::view;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "book-market", about = "Browse, save and trade used books")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List books matching a query string and optional filter changes
    Browse {
        /// Query string, e.g. "category=Fiction&sort=Price:%20Low%20to%20High"
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        condition: Option<String>,
        /// For Sale, For Exchange, Sale or Exchange, All Listings (or slugs)
        #[arg(long)]
        listing_type: Option<String>,
        /// Newest First, Price: Low to High, ... (or slugs such as price-asc)
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show a single listing
    Show { id: String },
    /// Print the values each filter menu offers
    Options,
    #[command(subcommand)]
    Wishlist(WishlistCommand),
    Login { email: String, password: String },
    Register { name: String, email: String, password: String },
    Logout,
    Whoami,
    /// List a book for sale or exchange (requires login)
    Sell {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// new, like-new, very-good, good or acceptable
        #[arg(long, default_value = "good")]
        condition: String,
        #[arg(long)]
        price: Option<f64>,
        /// sell, exchange or both
        #[arg(long, default_value = "sell")]
        listing_type: String,
    },
    /// Ask the seller to swap for a listing
    Exchange { id: String },
    /// Let the seller know you are interested in a listing
    Contact { id: String },
    /// Offer books to an organization in need
    Donate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        /// Titles, conditions, quantities
        #[arg(long)]
        books: String,
        /// pickup, dropoff or ship
        #[arg(long)]
        preference: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Ask for donated books on behalf of an organization
    RequestDonations {
        #[arg(long)]
        organization: String,
        /// school, library, nonprofit, community or other
        #[arg(long)]
        org_type: String,
        #[arg(long)]
        contact_name: String,
        #[arg(long)]
        contact_email: String,
        #[arg(long, default_value = "")]
        contact_phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        books_needed: String,
        #[arg(long)]
        purpose: String,
        #[arg(long, default_value = "")]
        verification: String,
    },
    /// Find charities that accept books
    Charities {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Edit the signed-in user's profile
    Profile {
        /// Defaults to the current name
        #[arg(long)]
        name: Option<String>,
        /// Defaults to the current email
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        bio: String,
    },
}

#[derive(Subcommand)]
enum WishlistCommand {
    List,
    Add { id: String },
    Remove { id: String },
    Clear,
}

/// Prints the replaced query string the way a browser would show the new URL
struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn replace(&self, query: &str) {
        println!("?{query}");
    }
}

fn report(notification: &Notification) -> Result<()> {
    println!("{}", view::render_notification(notification));
    if notification.destructive {
        bail!("{}", notification.title);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let query = match &cli.command {
        Command::Browse { query, .. } => query.as_str(),
        _ => "",
    };

    info!("Starting book market");
    let mut market = BookMarket::new(&config, query, Arc::new(StdoutNavigator)).await?;

    match cli.command {
        Command::Browse {
            category,
            condition,
            listing_type,
            sort,
            ..
        } => {
            if let Some(category) = category {
                market.filters.set_category(&category);
            }
            if let Some(condition) = condition {
                market.filters.set_condition(&condition);
            }
            if let Some(raw) = listing_type {
                let Some(kind) = ListingTypeFilter::parse(&raw) else {
                    bail!("unknown listing type: {raw}");
                };
                market.filters.set_listing_type(kind);
            }
            if let Some(raw) = sort {
                let Some(key) = SortKey::parse(&raw) else {
                    bail!("unknown sort: {raw}");
                };
                market.filters.set_sort(key);
            }

            if market.catalog_failed() {
                warn!("Catalog failed to load; results below are empty for that reason");
            }
            println!("{}", view::render_browse(&market.browse()));
        }
        Command::Show { id } => match market.catalog.get(&id) {
            Some(listing) => println!("{}", view::render_detail(listing)),
            None => bail!("no listing with id {id}"),
        },
        Command::Options => {
            println!("Categories: {}", CATEGORIES.join(", "));
            println!("Condition: {}", CONDITIONS.join(", "));
            let kinds: Vec<&str> = ListingTypeFilter::ALL.iter().map(|kind| kind.label()).collect();
            println!("Listing Type: {}", kinds.join(", "));
            let sorts: Vec<&str> = SortKey::ALL.iter().map(|key| key.label()).collect();
            println!("Sort By: {}", sorts.join(", "));
            let charities = charity::bundled()?;
            println!("Charity categories: {}", charity::categories(&charities).join(", "));
        }
        Command::Wishlist(WishlistCommand::List) => {
            println!("{}", view::render_wishlist(market.wishlist.items()));
        }
        Command::Wishlist(WishlistCommand::Add { id }) => {
            if market.save_listing(&id).await? {
                println!("Added to wishlist");
            } else {
                println!("Already in your wishlist");
            }
        }
        Command::Wishlist(WishlistCommand::Remove { id }) => {
            if market.wishlist.remove(&id).await? {
                println!("Removed from wishlist");
            } else {
                println!("Not in your wishlist");
            }
        }
        Command::Wishlist(WishlistCommand::Clear) => {
            market.wishlist.clear().await?;
            println!("Wishlist cleared");
        }
        Command::Login { email, password } => {
            let user = market.session.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let user = market.session.register(&name, &email, &password).await?;
            println!("Welcome, {} ({})", user.name, user.id);
        }
        Command::Logout => {
            market.session.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match market.session.user() {
            Some(user) => println!("{} <{}> ({})", user.name, user.email, user.id),
            None => println!("Not signed in"),
        },
        Command::Sell {
            title,
            author,
            description,
            category,
            condition,
            price,
            listing_type,
        } => {
            let draft = ListingDraft {
                title,
                author,
                description,
                category,
                condition: condition.parse()?,
                price,
                listing_type: listing_type.parse()?,
            };
            report(&market.add_book(draft).await)?;
        }
        Command::Exchange { id } => report(&market.request_exchange(&id).await)?,
        Command::Contact { id } => report(&market.contact_seller(&id).await)?,
        Command::Donate {
            name,
            email,
            phone,
            address,
            books,
            preference,
            notes,
        } => {
            let offer = DonationOffer {
                name,
                email,
                phone,
                address,
                books,
                preference: preference.parse()?,
                notes,
            };
            report(&market.forms.donate(offer).await)?;
        }
        Command::RequestDonations {
            organization,
            org_type,
            contact_name,
            contact_email,
            contact_phone,
            address,
            books_needed,
            purpose,
            verification,
        } => {
            let request = DonationRequest {
                organization,
                organization_type: org_type.parse()?,
                contact_name,
                contact_email,
                contact_phone,
                address,
                books_needed,
                purpose,
                verification,
            };
            report(&market.forms.request_donations(request).await)?;
        }
        Command::Charities { search, category } => {
            let charities = charity::bundled()?;
            let found = charity::search(&charities, &search, category.as_deref());
            println!("{}", view::render_charities(&found));
        }
        Command::Profile {
            name,
            email,
            phone,
            address,
            bio,
        } => {
            let current = market.session.user();
            let update = ProfileUpdate {
                name: name
                    .or_else(|| current.map(|user| user.name.clone()))
                    .unwrap_or_default(),
                email: email
                    .or_else(|| current.map(|user| user.email.clone()))
                    .unwrap_or_default(),
                phone,
                address,
                bio,
            };
            report(&market.update_profile(update).await)?;
        }
    }

    Ok(())
}
