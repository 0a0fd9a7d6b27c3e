//! Runs against a live PostgreSQL: `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`

use diesel::prelude::*;
use evently_gateway::db;
use evently_gateway::errors::DbError;
use evently_gateway::models::NewUser;
use evently_gateway::schema::users;
use uuid::Uuid;

fn connect() -> PgConnection {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let mut conn = db::establish(&url).expect("connect to test database");
    db::run_migrations(&mut conn).expect("apply schema");
    conn
}

fn insert_user(conn: &mut PgConnection) -> Uuid {
    diesel::insert_into(users::table)
        .values(&NewUser {
            email: format!("{}@example.test", Uuid::new_v4()),
            ..NewUser::default()
        })
        .returning(users::id)
        .get_result(conn)
        .expect("insert user")
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn duplicate_user_role_is_rejected() {
    let mut conn = connect();
    conn.test_transaction::<_, DbError, _>(|conn| {
        let user = insert_user(conn);
        let role = db::find_role_by_name(conn, "user")?.expect("seeded user role");

        db::assign_role(conn, user, role.id)?;
        let second = db::assign_role(conn, user, role.id);

        assert!(matches!(second, Err(DbError::Duplicate("user role"))));
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn migrations_are_idempotent() {
    let mut conn = connect();
    db::run_migrations(&mut conn).expect("second run succeeds");
    assert!(db::find_role_by_name(&mut conn, "admin").unwrap().is_some());
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn duplicate_role_permission_is_rejected() {
    use evently_gateway::schema::permissions;

    let mut conn = connect();
    conn.test_transaction::<_, DbError, _>(|conn| {
        let admin = db::find_role_by_name(conn, "admin")?.expect("seeded admin role");
        let permission: Uuid = diesel::insert_into(permissions::table)
            .values((
                permissions::resource.eq(format!("test-{}", Uuid::new_v4())),
                permissions::action.eq("read"),
            ))
            .returning(permissions::id)
            .get_result(conn)?;

        db::grant_permission(conn, admin.id, permission)?;
        let second = db::grant_permission(conn, admin.id, permission);

        assert!(matches!(second, Err(DbError::Duplicate("role permission"))));
        Ok(())
    });
}
