//! Customer commands: catalog, cart, orders and checkout.

use anyhow::Result;
use storefront_core::models::CheckoutDetails;
use storefront_core::{ApiClient, CartState, ProductCatalog, ProductQuery};

use crate::cli::CartCommand;
use crate::output;

use super::require_login;

pub async fn products(
    api: &ApiClient,
    page: u32,
    search: Option<String>,
    category: Option<i64>,
    all: bool,
    json: bool,
) -> Result<()> {
    let mut catalog = ProductCatalog::new();
    catalog.set_query(ProductQuery {
        search,
        category_id: category,
    });

    catalog.fetch_page(api, page).await?;
    if all {
        while catalog.has_more {
            catalog.load_more(api).await?;
        }
    }

    if json {
        return output::print_json(&catalog.products);
    }
    output::product_table(&catalog.products);
    if catalog.has_more {
        println!(
            "\nPage {} of {}. Use --page {} or --all for more.",
            catalog.current_page,
            catalog.last_page,
            catalog.current_page + 1
        );
    }
    Ok(())
}

pub async fn product(api: &ApiClient, slug: &str, json: bool) -> Result<()> {
    let product = api.product(slug).await?;
    if json {
        return output::print_json(&product);
    }
    output::product_detail(&product);
    Ok(())
}

pub async fn categories(api: &ApiClient, json: bool) -> Result<()> {
    let categories = api.categories().await?;
    if json {
        return output::print_json(&categories);
    }
    output::category_list(&categories);
    Ok(())
}

pub async fn cart(api: &ApiClient, action: Option<CartCommand>, json: bool) -> Result<()> {
    require_login(api)?;
    let mut state = CartState::new();

    match action {
        None => state.fetch(api).await?,
        Some(CartCommand::Add { product_id, quantity }) => state.add_item(api, product_id, quantity).await?,
        Some(CartCommand::Update { item_id, quantity }) => state.update_item(api, item_id, quantity).await?,
        Some(CartCommand::Remove { item_id }) => state.remove_item(api, item_id).await?,
    }

    let Some(cart) = state.cart else {
        return Ok(());
    };
    if json {
        return output::print_json(&cart);
    }
    output::cart_summary(&cart);
    Ok(())
}

pub async fn orders(api: &ApiClient, id: Option<String>, page: u32, json: bool) -> Result<()> {
    require_login(api)?;

    if let Some(id) = id {
        let order = api.order(&id).await?;
        if json {
            return output::print_json(&order);
        }
        output::order_detail(&order);
        return Ok(());
    }

    let orders = api.orders(page).await?;
    if json {
        return output::print_json(&orders.items);
    }
    output::order_table(&orders.items);
    output::pagination_footer(&orders.pagination);
    Ok(())
}

pub async fn checkout(
    api: &ApiClient,
    address: Option<String>,
    payment: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    require_login(api)?;

    let details = CheckoutDetails {
        shipping_address: address,
        payment_method: payment,
        notes,
    };
    let has_details =
        details.shipping_address.is_some() || details.payment_method.is_some() || details.notes.is_some();

    let order = api.checkout(has_details.then_some(&details)).await?;
    if json {
        return output::print_json(&order);
    }
    println!("Order placed.");
    output::order_detail(&order);
    Ok(())
}
