//! Plain-text rendering of API results.

use anyhow::Result;
use serde::Serialize;
use storefront_core::models::{
    AnalyticsOverview, Cart, Category, Order, Page, Pagination, Product, RoleInfo, User,
};
use storefront_core::utils::{format_amount, format_date, format_price, truncate};

const NAME_WIDTH: usize = 32;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn pagination_footer(pagination: &Pagination) {
    println!(
        "\nPage {} of {} ({} total)",
        pagination.current_page, pagination.last_page, pagination.total
    );
}

pub fn product_table(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    println!("{:>6}  {:<NAME_WIDTH$}  {:>16}  {:>6}", "ID", "NAME", "PRICE", "STOCK");
    for product in products {
        let sale = if product.is_on_sale() { " *" } else { "" };
        println!(
            "{:>6}  {:<NAME_WIDTH$}  {:>16}  {:>6}{}",
            product.id,
            truncate(&product.name, NAME_WIDTH),
            format_price(&product.price),
            product.stock,
            sale
        );
    }
}

pub fn product_detail(product: &Product) {
    println!("{} ({})", product.name, product.slug);
    print!("Price: {}", format_price(&product.price));
    if let (true, Some(compare)) = (product.is_on_sale(), product.compare_at_price.as_deref()) {
        print!("  (was {})", format_price(compare));
    }
    println!();
    println!("Stock: {}", if product.in_stock() { product.stock.to_string() } else { "out of stock".to_string() });
    if let Some(ref category) = product.category {
        println!("Category: {}", category.name);
    }
    if let Some(image) = product.primary_image() {
        println!("Image: {}", image.url);
    }
    if let Some(ref description) = product.description {
        println!("\n{}", description);
    }
}

pub fn category_list(categories: &[Category]) {
    for category in categories.iter().filter(|c| c.is_active) {
        match category.products_count {
            Some(count) => println!("{:>6}  {} ({})", category.id, category.name, count),
            None => println!("{:>6}  {}", category.id, category.name),
        }
    }
}

pub fn cart_summary(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    println!("{:>6}  {:<NAME_WIDTH$}  {:>4}  {:>16}", "ITEM", "PRODUCT", "QTY", "SUBTOTAL");
    for item in &cart.items {
        let name = item
            .product
            .as_ref()
            .map(|p| truncate(&p.name, NAME_WIDTH))
            .unwrap_or_else(|| format!("Product {}", item.product_id));
        println!(
            "{:>6}  {:<NAME_WIDTH$}  {:>4}  {:>16}",
            item.id,
            name,
            item.quantity,
            format_amount(item.subtotal)
        );
    }
    println!("\n{} item(s), total {}", cart.item_count, format_amount(cart.total));
}

pub fn order_table(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    println!("{:<16}  {:<12}  {:>16}  {}", "ORDER", "STATUS", "TOTAL", "PLACED");
    for order in orders {
        println!(
            "{:<16}  {:<12}  {:>16}  {}",
            order.order_number,
            order.status,
            format_amount(order.total),
            order.created_at.as_deref().map(format_date).unwrap_or_default()
        );
    }
}

pub fn order_detail(order: &Order) {
    println!("Order {} ({})", order.order_number, order.status);
    if let Some(ref placed) = order.created_at {
        println!("Placed: {}", format_date(placed));
    }
    if let Some(ref address) = order.shipping_address {
        println!("Ship to: {}", address);
    }
    if let Some(ref payment) = order.payment_method {
        println!("Payment: {}", payment);
    }
    println!();
    for item in &order.items {
        let name = item
            .product
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Product {}", item.product_id));
        println!("  {} x{}  {}", name, item.quantity, format_amount(item.subtotal));
    }
    println!("\nTotal: {}", format_amount(order.total));
}

pub fn user_detail(user: &User) {
    println!("{} <{}>", user.name, user.email);
    let roles = user.role_names();
    if !roles.is_empty() {
        println!("Roles: {}", roles.join(", "));
    }
    if let Some(mobile) = user.mobile_display() {
        println!("Mobile: {}", mobile);
    }
    if let Some(ref address) = user.address {
        println!("Address: {}", address);
    }
}

pub fn user_table(page: &Page<User>) {
    println!("{:>6}  {:<24}  {:<32}  {}", "ID", "NAME", "EMAIL", "ROLES");
    for user in &page.items {
        println!(
            "{:>6}  {:<24}  {:<32}  {}",
            user.id,
            truncate(&user.name, 24),
            truncate(&user.email, 32),
            user.role_names().join(",")
        );
    }
    pagination_footer(&page.pagination);
}

pub fn role_list(roles: &[RoleInfo]) {
    for role in roles {
        let permissions: Vec<&str> = role
            .permissions
            .iter()
            .flatten()
            .map(|p| p.name.as_str())
            .collect();
        println!("{:>4}  {}", role.id, role.name);
        if !permissions.is_empty() {
            println!("      {}", permissions.join(", "));
        }
    }
}

pub fn overview(stats: &AnalyticsOverview) {
    println!("Revenue:   {}", format_amount(stats.total_revenue));
    println!("Orders:    {}", stats.total_orders);
    println!("Products:  {}", stats.total_products);
    println!("Customers: {}", stats.total_customers);
    if !stats.recent_orders.is_empty() {
        println!("\nRecent orders");
        order_table(&stats.recent_orders);
    }
}
