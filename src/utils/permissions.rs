use crate::models::user::Claims;

// Tabla de capacidades: (rol, acción) -> permitido.
// Es una función pura para poder testearla sin levantar el servidor.
// Superusuario cuenta como comodín: siempre permitido.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Editor,
    Writer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            "writer" => Some(Role::Writer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePost,
    EditAnyPost,
    DeleteAnyPost,
    ApprovePost,
    BulkImportPosts,
    ViewAllPosts,
    CreateCategory,
    ManageCategories,
    ManagePages,
    ManageSections,
    ManageMenus,
    ManageSettings,
    ViewDashboard,
}

// Identidad autenticada ya interpretada (el JWT viaja con el rol en texto)
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: i64,
    pub role: Option<Role>,
    pub is_superuser: bool,
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Principal {
        Principal {
            user_id: claims.user_id,
            role: Role::parse(&claims.role),
            is_superuser: claims.is_superuser,
        }
    }

    pub fn can(&self, action: Action) -> bool {
        if self.is_superuser {
            return true;
        }
        let role = match self.role {
            Some(r) => r,
            // Rol desconocido en el token: denegar todo
            None => return false,
        };
        use Action::*;
        match action {
            CreatePost | CreateCategory | ViewDashboard => true,
            EditAnyPost | DeleteAnyPost | ApprovePost | BulkImportPosts | ViewAllPosts
            | ManageCategories | ManagePages | ManageSections | ManageMenus => {
                matches!(role, Role::Admin | Role::Editor)
            }
            ManageSettings => role == Role::Admin,
        }
    }

    // Regla a nivel de fila: el writer solo toca sus propios posts
    pub fn can_edit_post(&self, author_id: Option<i64>) -> bool {
        self.can(Action::EditAnyPost) || author_id == Some(self.user_id)
    }

    // Filtro de listado: Some(user_id) restringe la query a los posts propios
    pub fn post_author_filter(&self) -> Option<i64> {
        if self.can(Action::ViewAllPosts) {
            None
        } else {
            Some(self.user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Option<Role>, is_superuser: bool) -> Principal {
        Principal {
            user_id: 42,
            role,
            is_superuser,
        }
    }

    #[test]
    fn writer_cannot_approve_or_manage() {
        let p = principal(Some(Role::Writer), false);
        assert!(!p.can(Action::ApprovePost));
        assert!(!p.can(Action::ManageMenus));
        assert!(!p.can(Action::ManageSettings));
        assert!(!p.can(Action::BulkImportPosts));
    }

    #[test]
    fn writer_can_create_posts_and_categories() {
        let p = principal(Some(Role::Writer), false);
        assert!(p.can(Action::CreatePost));
        assert!(p.can(Action::CreateCategory));
    }

    #[test]
    fn editor_can_approve_but_not_settings() {
        let p = principal(Some(Role::Editor), false);
        assert!(p.can(Action::ApprovePost));
        assert!(p.can(Action::EditAnyPost));
        assert!(!p.can(Action::ManageSettings));
    }

    #[test]
    fn admin_can_everything() {
        let p = principal(Some(Role::Admin), false);
        assert!(p.can(Action::ManageSettings));
        assert!(p.can(Action::ApprovePost));
    }

    #[test]
    fn superuser_is_wildcard_even_with_unknown_role() {
        let p = principal(None, true);
        assert!(p.can(Action::ManageSettings));
        assert!(p.can(Action::ApprovePost));
    }

    #[test]
    fn unknown_role_without_superuser_denies_all() {
        let p = principal(None, false);
        assert!(!p.can(Action::CreatePost));
    }

    #[test]
    fn writer_edits_only_own_posts() {
        let p = principal(Some(Role::Writer), false);
        assert!(p.can_edit_post(Some(42)));
        assert!(!p.can_edit_post(Some(7)));
        assert!(!p.can_edit_post(None));
        assert_eq!(p.post_author_filter(), Some(42));
    }

    #[test]
    fn editor_sees_all_rows() {
        let p = principal(Some(Role::Editor), false);
        assert!(p.can_edit_post(Some(7)));
        assert_eq!(p.post_author_filter(), None);
    }
}
