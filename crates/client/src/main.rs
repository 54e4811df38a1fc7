//! `kora-admin`: terminal front-end for the Köra Skin backend.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use kora_auth::Capability;
use kora_client::api::ChangePasswordForm;
use kora_client::{
    ApiClient, ApiError, ClientConfig, FileStorage, Navigation, Navigator, Resource, Route, Screen,
    SessionStore,
};
use kora_core::{AtencionId, ClientaId, PersonalId, ProductoId, ServicioId, VentaId};
use kora_parties::{filter_by_activo, with_role};
use kora_products::{filter_servicios, search};
use kora_sales::{AtencionFilter, ListMode, VentaFilter};

#[derive(Debug, Parser)]
#[command(name = "kora-admin", version, about = "Köra Skin admin client")]
struct Cli {
    /// Backend base URL (overrides KORA_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session.
    Login {
        email: String,
        #[arg(long, env = "KORA_PASSWORD", hide_env_values = true)]
        password: String,
        /// Location to resume after login.
        #[arg(long)]
        from: Option<String>,
    },
    Logout,
    /// Show who is logged in and what they may do.
    Whoami,
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Navigate to a path and print the screen that would be shown.
    Open { path: String },
    /// List a resource.
    List {
        resource: Resource,
        /// Show only inactive records (clientas, productos, servicios).
        #[arg(long)]
        inactive: bool,
        /// Show paid sales instead of pending ones.
        #[arg(long)]
        paid: bool,
        /// Show closed appointments (done and paid).
        #[arg(long, conflicts_with = "cancelled")]
        closed: bool,
        #[arg(long)]
        cancelled: bool,
        /// Free-text filter.
        #[arg(long, default_value = "")]
        search: String,
        /// Only staff holding this role (personal).
        #[arg(long)]
        role: Option<String>,
    },
    /// Show one record as JSON.
    Show { resource: Resource, id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    kora_observability::init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(api_err) => eprintln!("error: {}", api_err.user_message()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env().context("loading configuration")?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }

    let storage = Arc::new(FileStorage::new(&config.session_dir));
    let session = Arc::new(SessionStore::init(storage).context("reading stored session")?);
    let api = ApiClient::new(&config, session.clone())?;
    let navigator = Navigator::new(session.clone());
    tracing::debug!(api_url = %config.api_url, "client ready");

    match cli.command {
        Command::Login {
            email,
            password,
            from,
        } => {
            if let Some(from) = from {
                navigator.remember(&from);
            }
            api.login(&email, &password).await?;
            let user = session.snapshot();
            println!(
                "Sesión iniciada como {}",
                user.user().map(|u| u.display_name()).unwrap_or(email)
            );
            print_navigation(&navigator.after_login());
        }
        Command::Logout => {
            session.logout().context("clearing stored session")?;
            println!("Sesión cerrada");
        }
        Command::Whoami => whoami(&session),
        Command::ChangePassword {
            current,
            new,
            confirm,
        } => {
            require_screen(&navigator, Route::ChangePassword)?;
            let message = api
                .change_password(ChangePasswordForm {
                    current_password: current,
                    new_password: new,
                    confirmation: confirm,
                })
                .await?;
            println!("{message}");
            print_navigation(&navigator.after_password_change());
        }
        Command::Open { path } => print_navigation(&navigator.navigate(&path)),
        Command::List {
            resource,
            inactive,
            paid,
            closed,
            cancelled,
            search: term,
            role,
        } => {
            require_screen(&navigator, Route::List(resource))?;
            let opts = ListOptions {
                inactive,
                paid,
                closed,
                cancelled,
                term,
                role,
            };
            list(&api, resource, &opts).await?;
        }
        Command::Show { resource, id } => {
            require_screen(&navigator, Route::Detail(resource, id))?;
            show(&api, resource, id).await?;
        }
    }
    Ok(())
}

/// Run the navigation for `route` and refuse to continue unless it renders.
fn require_screen(navigator: &Navigator, route: Route) -> Result<()> {
    let nav = navigator.navigate(&route.path());
    match &nav.screen {
        Screen::Render(shown) if *shown == route => Ok(()),
        _ => {
            print_navigation(&nav);
            bail!("no se puede abrir {}", route.path())
        }
    }
}

fn print_navigation(nav: &Navigation) {
    if nav.redirected() {
        println!("{} -> {}", nav.requested, nav.location);
    }
    match &nav.screen {
        Screen::Render(route) => println!("pantalla: {}", route.path()),
        Screen::AccessDenied { route, explanation } => {
            println!("acceso denegado a {}: {}", route.path(), explanation.reason);
        }
        Screen::NotFound(path) => println!("no encontrado: {path}"),
    }
}

fn whoami(session: &SessionStore) {
    let snapshot = session.snapshot();
    let Some(user) = snapshot.user().filter(|_| snapshot.is_authenticated()) else {
        println!("Sin sesión");
        return;
    };
    let roles = snapshot.roles();
    println!("{} <{}>", user.display_name(), user.email);
    println!("roles: {}", if roles.is_empty() { "-".to_string() } else { roles.to_string() });
    if snapshot.must_change_password() {
        println!("debe cambiar su contraseña");
    }
    for capability in Capability::granted(&roles) {
        println!("puede: {capability:?}");
    }
}

struct ListOptions {
    inactive: bool,
    paid: bool,
    closed: bool,
    cancelled: bool,
    term: String,
    role: Option<String>,
}

async fn list(api: &ApiClient, resource: Resource, opts: &ListOptions) -> Result<()> {
    match resource {
        Resource::Clientas => {
            let all = api.clientas().list().await?;
            let term = opts.term.trim().to_lowercase();
            for c in filter_by_activo(&all, opts.inactive)
                .into_iter()
                .filter(|c| term.is_empty() || c.full_name().to_lowercase().contains(&term))
            {
                println!(
                    "{:>5}  {:<30} {}",
                    display_id(c.id_clienta),
                    c.full_name(),
                    c.telefono.as_deref().unwrap_or("-")
                );
            }
        }
        Resource::Productos => {
            let all = api.productos().list().await?;
            for p in search(&all, &opts.term, opts.inactive) {
                let low = if p.is_low_stock() { "  (stock bajo)" } else { "" };
                println!(
                    "{:>5}  {:<30} ${:>10.0}  stock {}{low}",
                    display_id(p.id_producto),
                    p.nombre,
                    p.precio,
                    p.stock
                );
            }
        }
        Resource::Servicios => {
            let all = api.servicios().list().await?;
            for s in filter_servicios(&all, opts.inactive) {
                println!(
                    "{:>5}  {:<30} {:>4} min  ${:>10.0}",
                    display_id(s.id_servicio),
                    s.nombre,
                    s.duracion_min,
                    s.precio_base
                );
            }
        }
        Resource::Ventas => {
            let all = api.ventas().list().await?;
            let filter = VentaFilter {
                only_paid: opts.paid,
                clienta: opts.term.clone(),
                ..VentaFilter::default()
            };
            for v in filter.apply(&all) {
                println!(
                    "{:>5}  {:<19} {:<30} ${:>10.0}  {}",
                    display_id(v.id_venta),
                    v.fecha.as_deref().unwrap_or("-"),
                    v.clienta(),
                    v.total(),
                    v.estado_pago.as_deref().unwrap_or("-")
                );
            }
        }
        Resource::Atenciones => {
            let all = api.atenciones().list().await?;
            let mode = if opts.closed {
                ListMode::OnlyClosed
            } else if opts.cancelled {
                ListMode::OnlyCancelled
            } else {
                ListMode::Open
            };
            let filter = AtencionFilter {
                mode,
                term: opts.term.clone(),
                ..AtencionFilter::default()
            };
            for a in filter.apply(&all) {
                println!(
                    "{:>5}  {:<19} {:<30} {:<10} {}",
                    display_id(a.id_atencion),
                    a.fecha_inicio.as_deref().unwrap_or("-"),
                    a.clienta(),
                    a.estado_atencion.as_deref().unwrap_or("-"),
                    a.estado_pago.as_deref().unwrap_or("-")
                );
            }
        }
        Resource::Personal => {
            let all = api.personal().list().await?;
            let staff = match opts.role.as_deref() {
                Some(role) => with_role(&all, role),
                None => all.iter().collect(),
            };
            for p in staff
                .into_iter()
                .filter(|p| p.activo.is_set() != opts.inactive)
            {
                println!(
                    "{:>5}  {:<30} {}",
                    display_id(p.id_personal),
                    p.full_name(),
                    p.role_set()
                );
            }
        }
    }
    Ok(())
}

async fn show(api: &ApiClient, resource: Resource, id: i64) -> Result<()> {
    let json = match resource {
        Resource::Clientas => to_json(&api.clientas().get(ClientaId::new(id)?).await?)?,
        Resource::Productos => to_json(&api.productos().get(ProductoId::new(id)?).await?)?,
        Resource::Servicios => to_json(&api.servicios().get(ServicioId::new(id)?).await?)?,
        Resource::Ventas => to_json(&api.ventas().get(VentaId::new(id)?).await?)?,
        Resource::Atenciones => to_json(&api.atenciones().get(AtencionId::new(id)?).await?)?,
        Resource::Personal => to_json(&api.personal().get(PersonalId::new(id)?).await?)?,
    };
    println!("{json}");
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("formatting record")
}

fn display_id<T: std::fmt::Display>(id: Option<T>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}
