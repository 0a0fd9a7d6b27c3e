use crate::errors::DbError;
use crate::models::{NewRolePermission, NewUserRole, Role, RolePermission, UserRole};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::{debug, info};
use uuid::Uuid;

// Idempotent schema for the tables the backend owns
pub const SCHEMA_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS pgcrypto;

CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) UNIQUE NOT NULL,
    name VARCHAR(255),
    provider VARCHAR(50),
    provider_account_id VARCHAR(255),
    access_token TEXT,
    refresh_token TEXT,
    expires_at TIMESTAMP,
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMP NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS roles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(100) NOT NULL,
    description VARCHAR(255),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_roles_name UNIQUE (name)
);

CREATE TABLE IF NOT EXISTS permissions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    resource VARCHAR(100) NOT NULL,
    action VARCHAR(100) NOT NULL,
    description VARCHAR(255),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_permissions_resource_action UNIQUE (resource, action)
);

CREATE TABLE IF NOT EXISTS user_roles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    role_id UUID NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_user_roles_user_role UNIQUE (user_id, role_id),
    CONSTRAINT fk_user_roles_user FOREIGN KEY (user_id)
        REFERENCES users(id) ON DELETE CASCADE ON UPDATE CASCADE,
    CONSTRAINT fk_user_roles_role FOREIGN KEY (role_id)
        REFERENCES roles(id) ON DELETE CASCADE ON UPDATE CASCADE
);

CREATE TABLE IF NOT EXISTS role_permissions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    role_id UUID NOT NULL,
    permission_id UUID NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_role_permissions_role_permission UNIQUE (role_id, permission_id),
    CONSTRAINT fk_role_permissions_role FOREIGN KEY (role_id)
        REFERENCES roles(id) ON DELETE CASCADE ON UPDATE CASCADE,
    CONSTRAINT fk_role_permissions_permission FOREIGN KEY (permission_id)
        REFERENCES permissions(id) ON DELETE CASCADE ON UPDATE CASCADE
);

CREATE TABLE IF NOT EXISTS events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title VARCHAR(255) NOT NULL,
    description TEXT,
    location VARCHAR(255),
    starts_at TIMESTAMP NOT NULL,
    ends_at TIMESTAMP,
    capacity INTEGER,
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMP NOT NULL DEFAULT NOW()
);

-- featured arrived after the first release of events
ALTER TABLE events ADD COLUMN IF NOT EXISTS featured BOOLEAN NOT NULL DEFAULT FALSE;

CREATE TABLE IF NOT EXISTS reservations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    event_id UUID NOT NULL,
    user_id UUID NOT NULL,
    status VARCHAR(50) NOT NULL DEFAULT 'pending',
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT fk_reservations_event FOREIGN KEY (event_id)
        REFERENCES events(id) ON DELETE CASCADE,
    CONSTRAINT fk_reservations_user FOREIGN KEY (user_id)
        REFERENCES users(id) ON DELETE CASCADE
);

ALTER TABLE reservations ADD COLUMN IF NOT EXISTS calendar_event_id VARCHAR(255);

-- Insert initial roles if not exist
INSERT INTO roles (name, description)
VALUES
    ('admin', 'Backoffice administrator'),
    ('user', 'Registered attendee')
ON CONFLICT (name) DO NOTHING;

INSERT INTO permissions (resource, action, description)
VALUES
    ('events', 'read', 'View events'),
    ('events', 'create', 'Create events'),
    ('events', 'update', 'Edit events and their featured flag'),
    ('events', 'delete', 'Delete events'),
    ('reservations', 'read', 'View reservations'),
    ('reservations', 'create', 'Reserve a place at an event'),
    ('reservations', 'confirm', 'Confirm a reservation'),
    ('reservations', 'cancel', 'Cancel a reservation'),
    ('users', 'read', 'List users'),
    ('roles', 'assign', 'Assign roles to users')
ON CONFLICT (resource, action) DO NOTHING;

INSERT INTO role_permissions (role_id, permission_id)
SELECT r.id, p.id FROM roles r CROSS JOIN permissions p
WHERE r.name = 'admin'
ON CONFLICT (role_id, permission_id) DO NOTHING;

INSERT INTO role_permissions (role_id, permission_id)
SELECT r.id, p.id FROM roles r JOIN permissions p
    ON (p.resource, p.action) IN (
        ('events', 'read'),
        ('reservations', 'read'),
        ('reservations', 'create'),
        ('reservations', 'confirm'),
        ('reservations', 'cancel')
    )
WHERE r.name = 'user'
ON CONFLICT (role_id, permission_id) DO NOTHING;
"#;

pub fn establish(database_url: &str) -> Result<PgConnection, DbError> {
    Ok(PgConnection::establish(database_url)?)
}

pub fn run_migrations(conn: &mut PgConnection) -> Result<(), DbError> {
    conn.batch_execute(SCHEMA_SQL)?;
    info!("Database schema is up to date");
    Ok(())
}

fn unique_violation(err: DieselError, what: &'static str) -> DbError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            debug!("Rejected duplicate {}: {}", what, info.message());
            DbError::Duplicate(what)
        },
        other => DbError::Diesel(other),
    }
}

pub fn assign_role(conn: &mut PgConnection, user: Uuid, role: Uuid) -> Result<UserRole, DbError> {
    use crate::schema::user_roles::dsl::*;

    diesel::insert_into(user_roles)
        .values(&NewUserRole { user_id: user, role_id: role })
        .returning(UserRole::as_returning())
        .get_result(conn)
        .map_err(|e| unique_violation(e, "user role"))
}

pub fn grant_permission(
    conn: &mut PgConnection,
    role: Uuid,
    permission: Uuid,
) -> Result<RolePermission, DbError> {
    use crate::schema::role_permissions::dsl::*;

    diesel::insert_into(role_permissions)
        .values(&NewRolePermission { role_id: role, permission_id: permission })
        .returning(RolePermission::as_returning())
        .get_result(conn)
        .map_err(|e| unique_violation(e, "role permission"))
}

pub fn find_role_by_name(conn: &mut PgConnection, role_name: &str) -> Result<Option<Role>, DbError> {
    use crate::schema::roles::dsl::*;

    Ok(roles
        .filter(name.eq(role_name))
        .select(Role::as_select())
        .first(conn)
        .optional()?)
}
