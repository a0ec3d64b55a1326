use babybiome_db::schema_ddl;

#[test]
fn test_schema_ddl_snapshot() {
    insta::assert_snapshot!(schema_ddl());
}
