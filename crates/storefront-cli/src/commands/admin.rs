//! Store administration commands.

use anyhow::{anyhow, bail, Result};
use futures::future::try_join;
use storefront_core::models::{OrderStatus, ProductUpdate, RoleInput, UserInput};
use storefront_core::ApiClient;

use crate::cli::AdminCommand;
use crate::output;

use super::auth::{password, password_confirmation};
use super::require_login;

pub async fn execute(api: &ApiClient, command: AdminCommand, json: bool) -> Result<()> {
    require_login(api)?;
    if !api.session().is_admin() {
        bail!("This account is not an admin. Log in with `storefront login --admin`.");
    }

    match command {
        AdminCommand::Overview => overview(api, json).await,
        AdminCommand::Products { page } => {
            let products = api.admin_products(page).await?;
            if json {
                return output::print_json(&products.items);
            }
            output::product_table(&products.items);
            output::pagination_footer(&products.pagination);
            Ok(())
        }
        AdminCommand::Stock { product_id, stock } => {
            let update = ProductUpdate {
                stock: Some(stock),
                ..Default::default()
            };
            let product = api.admin_update_product(product_id, &update).await?;
            println!("{} now has {} in stock.", product.name, product.stock);
            Ok(())
        }
        AdminCommand::DeleteProduct { product_id } => {
            let message = api.admin_delete_product(product_id).await?;
            println!("{}", message.unwrap_or_else(|| format!("Product {} deleted.", product_id)));
            Ok(())
        }
        AdminCommand::Orders { id: Some(id), .. } => {
            let order = api.admin_order(&id).await?;
            if json {
                return output::print_json(&order);
            }
            output::order_detail(&order);
            Ok(())
        }
        AdminCommand::Orders { id: None, page } => {
            let orders = api.admin_orders(page).await?;
            if json {
                return output::print_json(&orders.items);
            }
            output::order_table(&orders.items);
            output::pagination_footer(&orders.pagination);
            Ok(())
        }
        AdminCommand::OrderStatus { id, status } => {
            let status = OrderStatus::parse(&status).ok_or_else(|| {
                let names: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
                anyhow!("Unknown status '{}'. Expected one of: {}", status, names.join(", "))
            })?;
            let message = api.admin_update_order_status(&id, status).await?;
            println!("{}", message.unwrap_or_else(|| format!("Order {} is now {}.", id, status)));
            Ok(())
        }
        AdminCommand::Users { page } => {
            let users = api.admin_users(page).await?;
            if json {
                return output::print_json(&users.items);
            }
            output::user_table(&users);
            Ok(())
        }
        AdminCommand::CreateUser { name, email, role } => {
            let password = password("Password for the new user: ")?;
            let confirmation = password_confirmation(&password)?;
            let user = UserInput {
                name: Some(name),
                email: Some(email),
                password: Some(password),
                password_confirmation: Some(confirmation),
                roles: (!role.is_empty()).then_some(role),
                ..Default::default()
            };
            let user = api.admin_create_user(&user).await?;
            if json {
                return output::print_json(&user);
            }
            println!("Created user {} <{}> (id {}).", user.name, user.email, user.id);
            Ok(())
        }
        AdminCommand::UserStatus { user_id, status } => {
            if status != "active" && status != "inactive" {
                bail!("Unknown status '{}'. Expected active or inactive", status);
            }
            let update = UserInput {
                status: Some(status),
                ..Default::default()
            };
            let user = api.admin_update_user(user_id, &update).await?;
            println!("{} is now {}.", user.name, user.status.as_deref().unwrap_or("updated"));
            Ok(())
        }
        AdminCommand::DeleteUser { user_id } => {
            let message = api.admin_delete_user(user_id).await?;
            println!("{}", message.unwrap_or_else(|| format!("User {} deleted.", user_id)));
            Ok(())
        }
        AdminCommand::Roles => {
            let roles = api.admin_roles().await?;
            if json {
                return output::print_json(&roles);
            }
            output::role_list(&roles);
            Ok(())
        }
        AdminCommand::CreateRole { name, permissions } => {
            let role = RoleInput {
                name,
                permissions: (!permissions.is_empty()).then_some(permissions),
            };
            let role = api.admin_create_role(&role).await?;
            println!("Created role {} (id {}).", role.name, role.id);
            Ok(())
        }
        AdminCommand::RenameRole { role_id, name } => {
            let role = api.admin_update_role(role_id, &RoleInput { name, permissions: None }).await?;
            println!("Role {} is now {}.", role.id, role.name);
            Ok(())
        }
        AdminCommand::DeleteRole { role_id } => {
            let message = api.admin_delete_role(role_id).await?;
            println!("{}", message.unwrap_or_else(|| format!("Role {} deleted.", role_id)));
            Ok(())
        }
        AdminCommand::SyncPermissions { role_id, permissions } => {
            let message = api.admin_sync_permissions(role_id, &permissions).await?;
            println!("{}", message.unwrap_or_else(|| format!("Permissions updated for role {}.", role_id)));
            Ok(())
        }
    }
}

/// Dashboard: stats plus the first page of orders, fetched together.
async fn overview(api: &ApiClient, json: bool) -> Result<()> {
    let (stats, orders) = try_join(api.admin_overview(), api.admin_orders(1)).await?;
    if json {
        return output::print_json(&stats);
    }
    output::overview(&stats);

    let pending: Vec<_> = orders
        .items
        .into_iter()
        .filter(|o| o.status == OrderStatus::Pending)
        .collect();
    if !pending.is_empty() {
        println!("\nAwaiting processing");
        output::order_table(&pending);
    }
    Ok(())
}
