use crate::app::{AppContext, LudexError, Result};
use crate::detail::DetailSource;
use crate::domain::{CatalogDetail, CatalogItem, Resource};
use crate::feed::FeedState;

pub fn register(ctx: &AppContext, name: &str, email: &str, password: &str) -> Result<()> {
    let user = ctx.auth.register(name, email, password)?;
    println!("Registered {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let user = ctx.auth.login(email, password).await?;
    println!("Logged in as {}", user.name);
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth.logout().await?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.auth.current_user()? {
        Some(user) => println!("{} <{}>", user.name, user.email),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub async fn browse(ctx: &AppContext, query: Option<&str>, pages: u32) -> Result<()> {
    let feed = ctx.feed();
    let mut rx = feed.subscribe();

    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            feed.set_query(q);
            rx.wait_for(|s| s.epoch > 0 && !s.loading)
                .await
                .map_err(|_| LudexError::Network("feed stopped".into()))?;
        }
        None => feed.refresh().await,
    }

    for _ in 1..pages {
        if !feed.state().has_more {
            break;
        }
        feed.load_next_page().await;
        if feed.state().error.is_some() {
            break;
        }
    }

    print_feed(&feed.state());
    Ok(())
}

fn print_feed(state: &FeedState) {
    if let Some(error) = &state.error {
        eprintln!("Error: {}", error);
    }

    if state.items.is_empty() {
        println!("No games");
        return;
    }

    for item in &state.items {
        print_item(item);
    }

    let more = if state.has_more { ", more available" } else { "" };
    println!(
        "\n{} shown of {} (page {}{})",
        state.items.len(),
        state.total_count,
        state.page,
        more
    );
}

fn print_item(item: &CatalogItem) {
    println!(
        "{:>8}  {:<40} {:>4}  {}  {}",
        item.id,
        item.title,
        item.display_rating(),
        item.display_release_date(),
        item.genre_names.join(", ")
    );
}

pub async fn show(ctx: &AppContext, id: i64) -> Result<()> {
    let owner_id = ctx.auth.owner_id()?;
    let view = ctx.details.load(id, owner_id).await;

    let (detail, source) = match view.detail {
        Resource::Success(found) => found,
        Resource::Error(message) => return Err(LudexError::Network(message)),
        Resource::Loading => return Ok(()),
    };

    print_detail(&detail);
    if source == DetailSource::Bookmark {
        println!("[bookmarked]");
    }

    match view.screenshots {
        Resource::Success(page) if !page.results.is_empty() => {
            println!("\nScreenshots:");
            for shot in page.results {
                println!("  {}", shot.image);
            }
        }
        Resource::Error(message) => eprintln!("\nScreenshots unavailable: {}", message),
        _ => {}
    }

    Ok(())
}

fn print_detail(detail: &CatalogDetail) {
    let summary = detail.summary();
    println!("{}", detail.title);
    println!(
        "Rating {}  Released {}  Playtime {}h",
        summary.display_rating(),
        summary.display_release_date(),
        detail.playtime_hours
    );
    if let Some(score) = detail.critic_score {
        println!("Critic score: {}", score);
    }
    if let Some(age) = detail.age_rating_name() {
        println!("Age rating: {}", age);
    }

    let lists = [
        ("Platforms", detail.platform_names()),
        ("Genres", detail.genre_names()),
        ("Developers", detail.developer_names()),
        ("Publishers", detail.publisher_names()),
    ];
    for (label, names) in lists {
        if !names.is_empty() {
            println!("{}: {}", label, names.join(", "));
        }
    }

    if let Some(website) = detail.website() {
        println!("Website: {}", website);
    }
    if let Some(description) = &detail.description {
        println!("\n{}", html_escape::decode_html_entities(description));
    }
}

pub async fn toggle_bookmark(ctx: &AppContext, id: i64) -> Result<()> {
    let owner_id = ctx.auth.owner_id()?;
    let (detail, _) = ctx.details.resolve(id, owner_id).await?;

    if ctx.bookmarks.toggle(&detail, owner_id).await? {
        println!("Bookmarked: {}", detail.title);
    } else {
        println!("Removed bookmark: {}", detail.title);
    }
    Ok(())
}

pub fn list_bookmarks(ctx: &AppContext) -> Result<()> {
    let owner_id = ctx.auth.owner_id()?;
    let records = ctx.bookmarks.list(owner_id)?;

    if records.is_empty() {
        println!("No bookmarks");
        return Ok(());
    }

    for record in records {
        println!(
            "{:>8}  {:<40} {}  {}",
            record.item_id,
            record.title,
            record.bookmarked_at.format("%Y-%m-%d"),
            record.genre_names().join(", ")
        );
    }

    Ok(())
}

pub async fn open_website(ctx: &AppContext, id: i64) -> Result<()> {
    let owner_id = ctx.auth.owner_id()?;
    let (detail, _) = ctx.details.resolve(id, owner_id).await?;

    let website = detail
        .website()
        .ok_or_else(|| LudexError::Validation(format!("{} has no website", detail.title)))?;
    open::that(website)?;
    println!("Opened {}", website);
    Ok(())
}
