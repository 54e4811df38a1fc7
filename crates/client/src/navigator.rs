//! Route table and navigation.
//!
//! Every navigation re-reads the session and runs the access gate, then the
//! role filter of the target screen. The login redirect remembers where the
//! user was going so the navigator can resume there after login (and after a
//! forced password change).

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use kora_auth::{
    AccessExplanation, AllowList, CHANGE_PASSWORD_PATH, Capability, DASHBOARD_PATH,
    GuardDecision, LOGIN_PATH, Session, evaluate_session, explain_access, normalize_path,
};
use kora_core::DomainError;
use tracing::{debug, info};

use crate::session_store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Clientas,
    Productos,
    Servicios,
    Ventas,
    Atenciones,
    Personal,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Clientas,
        Resource::Productos,
        Resource::Servicios,
        Resource::Ventas,
        Resource::Atenciones,
        Resource::Personal,
    ];

    pub fn segment(&self) -> &'static str {
        match self {
            Resource::Clientas => "clientas",
            Resource::Productos => "productos",
            Resource::Servicios => "servicios",
            Resource::Ventas => "ventas",
            Resource::Atenciones => "atenciones",
            Resource::Personal => "personal",
        }
    }

    /// Path segment of the create screen (grammatical gender of the noun).
    pub fn create_segment(&self) -> &'static str {
        match self {
            Resource::Clientas | Resource::Ventas | Resource::Atenciones => "nueva",
            Resource::Productos | Resource::Servicios | Resource::Personal => "nuevo",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for Resource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_matches('/').to_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.segment() == wanted)
            .ok_or_else(|| DomainError::validation(format!("recurso desconocido: {s}")))
    }
}

/// A screen of the admin client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Root,
    Dashboard,
    ChangePassword,
    List(Resource),
    Create(Resource),
    Detail(Resource, i64),
    Edit(Resource, i64),
    PagoVenta(i64),
    PagoAtencion(i64),
    NotFound(String),
}

impl Route {
    pub fn parse(location: &str) -> Route {
        let path = normalize_path(location);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Root,
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["cambiar-clave"] => Route::ChangePassword,
            [res, rest @ ..] => match (res.parse::<Resource>(), rest) {
                (Ok(r), []) => Route::List(r),
                (Ok(r), [seg]) if *seg == r.create_segment() => Route::Create(r),
                (Ok(r), [id]) => match parse_id(id) {
                    Some(id) => Route::Detail(r, id),
                    None => Route::NotFound(path.to_string()),
                },
                (Ok(r), [id, "editar"]) => match parse_id(id) {
                    Some(id) => Route::Edit(r, id),
                    None => Route::NotFound(path.to_string()),
                },
                (Ok(Resource::Ventas), [id, "pagos", "nuevo"]) => match parse_id(id) {
                    Some(id) => Route::PagoVenta(id),
                    None => Route::NotFound(path.to_string()),
                },
                (Ok(Resource::Atenciones), [id, "pagos", "nuevo"]) => match parse_id(id) {
                    Some(id) => Route::PagoAtencion(id),
                    None => Route::NotFound(path.to_string()),
                },
                _ => Route::NotFound(path.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => LOGIN_PATH.to_string(),
            Route::Root => "/".to_string(),
            Route::Dashboard => DASHBOARD_PATH.to_string(),
            Route::ChangePassword => CHANGE_PASSWORD_PATH.to_string(),
            Route::List(r) => format!("/{r}"),
            Route::Create(r) => format!("/{r}/{}", r.create_segment()),
            Route::Detail(r, id) => format!("/{r}/{id}"),
            Route::Edit(r, id) => format!("/{r}/{id}/editar"),
            Route::PagoVenta(id) => format!("/ventas/{id}/pagos/nuevo"),
            Route::PagoAtencion(id) => format!("/atenciones/{id}/pagos/nuevo"),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Roles allowed to see the screen once the gate has passed.
    pub fn allow_list(&self) -> AllowList {
        match self {
            Route::Create(Resource::Ventas) => Capability::RegisterVenta.allow_list(),
            Route::Create(Resource::Atenciones) => Capability::RegisterAtencion.allow_list(),
            _ => AllowList::unrestricted(),
        }
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// What ends up on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Render(Route),
    /// Gate passed but the role filter did not: shown in place, no redirect.
    AccessDenied {
        route: Route,
        explanation: AccessExplanation,
    },
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    /// Final location after redirects.
    pub location: String,
    pub screen: Screen,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        normalize_path(&self.requested) != normalize_path(&self.location)
    }
}

#[derive(Debug)]
pub struct Navigator {
    session: Arc<SessionStore>,
    return_to: Mutex<Option<String>>,
}

impl Navigator {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            return_to: Mutex::new(None),
        }
    }

    /// Location to resume after login, if one was remembered.
    pub fn return_to(&self) -> Option<String> {
        self.slot().clone()
    }

    /// Remember a location to resume after login.
    pub fn remember(&self, location: &str) {
        let path = normalize_path(location);
        if path == LOGIN_PATH || path == "/" || path == DASHBOARD_PATH || path == CHANGE_PASSWORD_PATH {
            return;
        }
        debug!(location, "remembering origin");
        *self.slot() = Some(location.to_string());
    }

    pub fn navigate(&self, location: &str) -> Navigation {
        let session = self.session.snapshot();
        let (final_location, screen) = self.resolve(&session, location);
        Navigation {
            requested: location.to_string(),
            location: final_location,
            screen,
        }
    }

    /// Where to go right after a successful login.
    pub fn after_login(&self) -> Navigation {
        if self.session.snapshot().must_change_password() {
            return self.navigate(CHANGE_PASSWORD_PATH);
        }
        let target = self.take_return_to();
        info!(destination = %target, "resuming after login");
        self.navigate(&target)
    }

    /// Where to go after the password was changed.
    pub fn after_password_change(&self) -> Navigation {
        let target = self.take_return_to();
        self.navigate(&target)
    }

    fn take_return_to(&self) -> String {
        self.slot()
            .take()
            .unwrap_or_else(|| DASHBOARD_PATH.to_string())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.return_to.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, session: &Session, location: &str) -> (String, Screen) {
        let route = Route::parse(location);
        match route {
            Route::Root => self.resolve(session, DASHBOARD_PATH),
            Route::Login if session.is_authenticated() => self.resolve(session, DASHBOARD_PATH),
            Route::Login => (LOGIN_PATH.to_string(), Screen::Render(Route::Login)),
            route => match evaluate_session(session, location) {
                GuardDecision::RedirectToLogin { from } => {
                    self.remember(&from);
                    (LOGIN_PATH.to_string(), Screen::Render(Route::Login))
                }
                GuardDecision::RedirectToChangePassword => {
                    self.remember(location);
                    (
                        CHANGE_PASSWORD_PATH.to_string(),
                        Screen::Render(Route::ChangePassword),
                    )
                }
                GuardDecision::Render => (location.to_string(), Self::filter(session, route)),
            },
        }
    }

    fn filter(session: &Session, route: Route) -> Screen {
        if let Route::NotFound(path) = route {
            return Screen::NotFound(path);
        }
        let explanation = explain_access(&route.allow_list(), &session.roles());
        if explanation.granted {
            Screen::Render(route)
        } else {
            debug!(route = %route.path(), reason = %explanation.reason, "access denied");
            Screen::AccessDenied { route, explanation }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};

    fn store_with(user: Option<&str>) -> Arc<SessionStore> {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(user) = user {
            storage.set(TOKEN_KEY, "tok").unwrap();
            storage.set(USER_KEY, user).unwrap();
        }
        Arc::new(SessionStore::init(storage).unwrap())
    }

    const VENDEDORA: &str = r#"{"email":"v@kora.cl","roles":["Vendedora"]}"#;
    const MASO_MUST_CHANGE: &str =
        r#"{"email":"m@kora.cl","roles":[{"nombre":"masoterapeuta"}],"must_change_password":"1"}"#;

    #[test]
    fn parses_route_table() {
        assert_eq!(Route::parse("/"), Route::Root);
        assert_eq!(Route::parse("/clientas/"), Route::List(Resource::Clientas));
        assert_eq!(Route::parse("/clientas/nueva"), Route::Create(Resource::Clientas));
        assert_eq!(Route::parse("/productos/nuevo"), Route::Create(Resource::Productos));
        assert_eq!(Route::parse("/ventas/12?x=1"), Route::Detail(Resource::Ventas, 12));
        assert_eq!(Route::parse("/personal/3/editar"), Route::Edit(Resource::Personal, 3));
        assert_eq!(Route::parse("/ventas/4/pagos/nuevo"), Route::PagoVenta(4));
        assert_eq!(Route::parse("/atenciones/9/pagos/nuevo"), Route::PagoAtencion(9));
        assert_eq!(Route::parse("/productos/nueva"), Route::NotFound("/productos/nueva".into()));
        assert_eq!(Route::parse("/clientas/0"), Route::NotFound("/clientas/0".into()));
        assert_eq!(Route::parse("/nada"), Route::NotFound("/nada".into()));
    }

    #[test]
    fn route_paths_parse_back() {
        for route in [
            Route::Dashboard,
            Route::List(Resource::Atenciones),
            Route::Create(Resource::Personal),
            Route::Edit(Resource::Servicios, 7),
            Route::PagoAtencion(2),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn anonymous_is_sent_to_login_and_origin_is_kept() {
        let nav = Navigator::new(store_with(None));
        let n = nav.navigate("/ventas/5");
        assert_eq!(n.location, LOGIN_PATH);
        assert_eq!(n.screen, Screen::Render(Route::Login));
        assert!(n.redirected());
        assert_eq!(nav.return_to().as_deref(), Some("/ventas/5"));
    }

    #[test]
    fn root_goes_to_dashboard() {
        let nav = Navigator::new(store_with(Some(VENDEDORA)));
        let n = nav.navigate("/");
        assert_eq!(n.location, DASHBOARD_PATH);
        assert_eq!(n.screen, Screen::Render(Route::Dashboard));
    }

    #[test]
    fn logged_in_user_skips_login_screen() {
        let nav = Navigator::new(store_with(Some(VENDEDORA)));
        assert_eq!(nav.navigate("/login").location, DASHBOARD_PATH);
    }

    #[test]
    fn must_change_password_pins_the_change_screen() {
        let nav = Navigator::new(store_with(Some(MASO_MUST_CHANGE)));
        let n = nav.navigate("/clientas");
        assert_eq!(n.location, CHANGE_PASSWORD_PATH);
        let n = nav.navigate("/cambiar-clave");
        assert_eq!(n.screen, Screen::Render(Route::ChangePassword));
        assert!(!n.redirected());
    }

    #[test]
    fn role_filter_denies_in_place() {
        let nav = Navigator::new(store_with(Some(VENDEDORA)));

        let n = nav.navigate("/ventas/nueva");
        assert_eq!(n.screen, Screen::Render(Route::Create(Resource::Ventas)));

        let n = nav.navigate("/atenciones/nueva");
        assert_eq!(n.location, "/atenciones/nueva");
        match n.screen {
            Screen::AccessDenied { route, explanation } => {
                assert_eq!(route, Route::Create(Resource::Atenciones));
                assert!(!explanation.granted);
                assert_eq!(explanation.user_roles, vec!["vendedora".to_string()]);
            }
            other => panic!("expected access denied, got {other:?}"),
        }
    }

    #[test]
    fn unknown_path_is_gated_then_not_found() {
        let nav = Navigator::new(store_with(None));
        assert_eq!(nav.navigate("/nada").location, LOGIN_PATH);

        let nav = Navigator::new(store_with(Some(VENDEDORA)));
        assert_eq!(nav.navigate("/nada").screen, Screen::NotFound("/nada".into()));
    }

    #[test]
    fn after_login_resumes_origin_once() {
        let nav = Navigator::new(store_with(Some(VENDEDORA)));
        nav.remember("/productos/3");
        assert_eq!(nav.after_login().location, "/productos/3");
        assert_eq!(nav.after_login().location, DASHBOARD_PATH);
    }

    #[test]
    fn forced_change_keeps_origin_for_later() {
        let nav = Navigator::new(store_with(Some(MASO_MUST_CHANGE)));
        nav.remember("/atenciones");
        assert_eq!(nav.after_login().location, CHANGE_PASSWORD_PATH);
        assert_eq!(nav.return_to().as_deref(), Some("/atenciones"));
    }
}
