//! Command-line arguments.

use clap::{Parser, Subcommand};

/// Storefront - shop, manage orders and administer the store from a terminal
#[derive(Parser, Debug)]
#[command(name = "storefront", author, version, about)]
pub struct Args {
    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session in the OS keychain
    Login {
        /// Account email (defaults to the last one used)
        #[arg(short, long)]
        email: Option<String>,

        /// Use the admin login endpoint
        #[arg(long)]
        admin: bool,
    },

    /// Create a customer account and sign in with it
    Register {
        #[arg(long)]
        name: String,

        #[arg(short, long)]
        email: String,
    },

    /// Sign out and erase the stored session
    Logout {
        /// Revoke the sessions on every device
        #[arg(long)]
        all: bool,
    },

    /// Show the signed-in user
    Whoami,

    /// Update your profile
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        mobile: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Change your password (prompts for both)
    Passwd,

    /// Browse the catalog
    Products {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long)]
        search: Option<String>,

        /// Category id
        #[arg(short, long)]
        category: Option<i64>,

        /// Keep loading pages until the last one
        #[arg(long)]
        all: bool,
    },

    /// Show one product
    Product {
        slug: String,
    },

    /// List categories
    Categories,

    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartCommand>,
    },

    /// List your orders, or show one
    Orders {
        /// Order id
        id: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Place an order from the cart
    Checkout {
        #[arg(long)]
        address: Option<String>,

        /// Payment method, e.g. cod
        #[arg(long)]
        payment: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Store administration (admin accounts only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// Add a product
    Add {
        product_id: i64,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Change the quantity of a cart item
    Update {
        item_id: i64,
        quantity: u32,
    },

    /// Remove a cart item
    Remove {
        item_id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Sales overview
    Overview,

    /// List products
    Products {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Set the stock level of a product
    Stock {
        product_id: i64,
        stock: i64,
    },

    /// Delete a product
    DeleteProduct {
        product_id: i64,
    },

    /// List orders, or show one
    Orders {
        id: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Move an order to a new status
    OrderStatus {
        id: String,

        /// pending, processing, shipped, delivered or cancelled
        status: String,
    },

    /// List users
    Users {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Create a user (prompts for the password)
    CreateUser {
        #[arg(long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Role names, repeatable
        #[arg(short, long)]
        role: Vec<String>,
    },

    /// Activate or deactivate a user
    UserStatus {
        user_id: i64,

        /// active or inactive
        status: String,
    },

    /// Delete a user
    DeleteUser {
        user_id: i64,
    },

    /// List roles and their permissions
    Roles,

    /// Create a role
    CreateRole {
        name: String,

        /// Permission ids
        permissions: Vec<i64>,
    },

    /// Rename a role
    RenameRole {
        role_id: i64,
        name: String,
    },

    /// Delete a role
    DeleteRole {
        role_id: i64,
    },

    /// Replace the permissions of a role
    SyncPermissions {
        role_id: i64,

        /// Permission ids
        #[arg(required = true)]
        permissions: Vec<i64>,
    },
}

impl Command {
    /// Commands that replace or erase the stored session without needing it verified.
    pub fn skips_restore(&self) -> bool {
        matches!(self, Command::Login { .. } | Command::Register { .. } | Command::Logout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_order_status() {
        let args = Args::parse_from(["storefront", "admin", "order-status", "ORD-1", "shipped"]);
        match args.command {
            Command::Admin(AdminCommand::OrderStatus { id, status }) => {
                assert_eq!(id, "ORD-1");
                assert_eq!(status, "shipped");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_products_filters() {
        let args = Args::parse_from(["storefront", "products", "--search", "shoe", "-c", "3", "--all"]);
        match args.command {
            Command::Products { page, search, category, all } => {
                assert_eq!(page, 1);
                assert_eq!(search.as_deref(), Some("shoe"));
                assert_eq!(category, Some(3));
                assert!(all);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_session_commands_skip_restore() {
        let args = Args::parse_from(["storefront", "login", "--admin"]);
        assert!(args.command.skips_restore());
        assert!(Args::parse_from(["storefront", "logout"]).command.skips_restore());
        assert!(!Args::parse_from(["storefront", "cart"]).command.skips_restore());
    }

    #[test]
    fn test_parse_admin_create_user_roles() {
        let args = Args::parse_from([
            "storefront", "admin", "create-user", "--name", "Cy", "-e", "cy@example.com", "-r", "admin", "-r", "customer",
        ]);
        match args.command {
            Command::Admin(AdminCommand::CreateUser { name, role, .. }) => {
                assert_eq!(name, "Cy");
                assert_eq!(role, vec!["admin", "customer"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_logout_all() {
        let args = Args::parse_from(["storefront", "logout", "--all"]);
        assert!(matches!(args.command, Command::Logout { all: true }));
    }
}
