//! # Unit-of-Work Flows
//!
//! Drives complete units of work through the public API: entities are
//! persisted, linked through the relation catalog, committed into the
//! in-memory store, and the store log is checked for dependency order.

#[cfg(test)]
mod tests {
    use uow_flush_ordering::adapters::{InMemoryExecutor, RelationMapping, StaticRelationCatalog};
    use uow_flush_ordering::domain::invariants::{
        invariant_completeness, invariant_dependency_order, invariant_exactly_once,
    };
    use uow_flush_ordering::{
        EntityId, EntityType, FlushConfig, FlushError, FlushOrderingApi, FlushOrderingService,
        LifecycleState, NoopHooks, OperationKind, OwningSide, RelationKind, UnitOfWork,
        WorkRegistry,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn shop_catalog() -> StaticRelationCatalog {
        StaticRelationCatalog::new()
            .with_relation(
                RelationKind::ManyToOne,
                EntityType::new("Order"),
                EntityType::new("Customer"),
                OwningSide::Parent,
            )
            .with_relation(
                RelationKind::OneToMany,
                EntityType::new("Order"),
                EntityType::new("LineItem"),
                OwningSide::Child,
            )
            .with_relation(
                RelationKind::ManyToMany,
                EntityType::new("Order"),
                EntityType::new("Coupon"),
                OwningSide::Parent,
            )
    }

    /// Order#1 -> Customer#7 (many-to-one), Order#1 -> LineItem#1/#2 (one-to-many)
    fn shop_unit_of_work(catalog: &StaticRelationCatalog) -> UnitOfWork {
        let mut uow = UnitOfWork::new();
        uow.persist("Order#1", EntityType::new("Order")).unwrap();
        uow.merge("Customer#7", EntityType::new("Customer")).unwrap();
        uow.persist("LineItem#1", EntityType::new("LineItem")).unwrap();
        uow.persist("LineItem#2", EntityType::new("LineItem")).unwrap();

        uow.link_with_catalog("Order#1", "Customer#7", RelationKind::ManyToOne, catalog)
            .unwrap();
        uow.link_with_catalog("Order#1", "LineItem#1", RelationKind::OneToMany, catalog)
            .unwrap();
        uow.link_with_catalog("Order#1", "LineItem#2", RelationKind::OneToMany, catalog)
            .unwrap();
        uow
    }

    fn logged_ids(executor: &InMemoryExecutor) -> Vec<&str> {
        executor.log().iter().map(|(id, _)| id.as_str()).collect()
    }

    // =============================================================================
    // ORDERING THROUGH THE STORE
    // =============================================================================

    #[test]
    fn test_order_with_customer_and_line_items() {
        let catalog = shop_catalog();
        let mut uow = shop_unit_of_work(&catalog);
        let mut store = InMemoryExecutor::new();

        let report = uow.commit(&mut store, &mut NoopHooks).unwrap();

        assert_eq!(report.written, 4);
        let log = logged_ids(&store);
        let pos = |id: &str| log.iter().position(|x| *x == id).unwrap();
        assert!(pos("Customer#7") < pos("Order#1"));
        assert!(pos("Order#1") < pos("LineItem#1"));
        assert!(pos("Order#1") < pos("LineItem#2"));
        assert_eq!(store.row_count(), 4);
    }

    #[test]
    fn test_clean_referenced_entity_skipped() {
        let catalog = shop_catalog();
        let mut uow = shop_unit_of_work(&catalog);
        uow.registry_mut().mark_dirty("Customer#7", false).unwrap();
        let mut store =
            InMemoryExecutor::new().with_row("Customer#7", EntityType::new("Customer"));

        let report = uow.commit(&mut store, &mut NoopHooks).unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.written, 3);
        assert!(!logged_ids(&store).contains(&"Customer#7"));
        assert!(store.contains("Customer#7"));
    }

    #[test]
    fn test_address_written_after_its_customer() {
        let mut uow = UnitOfWork::new();
        uow.persist("Order#1", EntityType::new("Order")).unwrap();
        uow.persist("Address#1", EntityType::new("Address")).unwrap();
        uow.persist("Customer#1", EntityType::new("Customer")).unwrap();
        uow.link("Order#1", "Address#1", RelationKind::ManyToOne, Some(OwningSide::Parent))
            .unwrap();
        uow.link("Order#1", "Customer#1", RelationKind::ManyToOne, Some(OwningSide::Parent))
            .unwrap();
        // Address holds the FK to Customer
        uow.link("Customer#1", "Address#1", RelationKind::OneToMany, Some(OwningSide::Child))
            .unwrap();
        let mut store = InMemoryExecutor::new();

        uow.commit(&mut store, &mut NoopHooks).unwrap();

        assert_eq!(logged_ids(&store), vec!["Customer#1", "Address#1", "Order#1"]);
    }

    #[test]
    fn test_mutual_one_to_one_terminates() {
        let mut uow = UnitOfWork::new();
        uow.persist("A", EntityType::new("Husband")).unwrap();
        uow.persist("B", EntityType::new("Wife")).unwrap();
        uow.link("A", "B", RelationKind::OneToOne, Some(OwningSide::Parent))
            .unwrap();
        uow.link("B", "A", RelationKind::OneToOne, Some(OwningSide::Parent))
            .unwrap();

        let order = uow.flush_order().unwrap();

        assert_eq!(order.len(), 2);
        assert!(invariant_exactly_once(&order));
        assert!(invariant_completeness(&order, uow.registry()));
    }

    #[test]
    fn test_removal_deletes_referencing_rows_first() {
        let catalog = shop_catalog();
        let mut store = InMemoryExecutor::new()
            .with_row("Order#1", EntityType::new("Order"))
            .with_row("Customer#7", EntityType::new("Customer"))
            .with_row("LineItem#1", EntityType::new("LineItem"));

        let mut uow = UnitOfWork::new();
        uow.remove("Order#1", EntityType::new("Order")).unwrap();
        uow.remove("Customer#7", EntityType::new("Customer")).unwrap();
        uow.remove("LineItem#1", EntityType::new("LineItem")).unwrap();
        uow.link_with_catalog("Order#1", "Customer#7", RelationKind::ManyToOne, &catalog)
            .unwrap();
        uow.link_with_catalog("Order#1", "LineItem#1", RelationKind::OneToMany, &catalog)
            .unwrap();

        let report = uow.commit(&mut store, &mut NoopHooks).unwrap();

        assert_eq!(report.deleted, 3);
        assert_eq!(logged_ids(&store), vec!["LineItem#1", "Order#1", "Customer#7"]);
        assert!(store.log().iter().all(|(_, op)| *op == OperationKind::Delete));
        assert_eq!(store.row_count(), 0);
    }

    #[test]
    fn test_join_rows_persisted_after_both_endpoints() {
        let catalog = shop_catalog();
        let mut uow = UnitOfWork::new();
        uow.persist("Order#1", EntityType::new("Order")).unwrap();
        uow.persist("Coupon#5", EntityType::new("Coupon")).unwrap();
        uow.link_with_catalog("Order#1", "Coupon#5", RelationKind::ManyToMany, &catalog)
            .unwrap();
        let mut store = InMemoryExecutor::new();

        let report = uow.commit(&mut store, &mut NoopHooks).unwrap();

        assert_eq!(report.join_rows, 1);
        let row = store.join_rows().iter().next().unwrap();
        assert_eq!(row.owner, EntityId::from("Order#1"));
        assert_eq!(row.inverse, EntityId::from("Coupon#5"));
    }

    #[test]
    fn test_batched_commit() {
        let catalog = shop_catalog();
        let config = FlushConfig {
            batch_size: 2,
            ..Default::default()
        };
        let mut uow = UnitOfWork::with_config(config);
        uow.persist("Order#1", EntityType::new("Order")).unwrap();
        uow.persist("Customer#7", EntityType::new("Customer")).unwrap();
        uow.persist("LineItem#1", EntityType::new("LineItem")).unwrap();
        uow.link_with_catalog("Order#1", "Customer#7", RelationKind::ManyToOne, &catalog)
            .unwrap();
        uow.link_with_catalog("Order#1", "LineItem#1", RelationKind::OneToMany, &catalog)
            .unwrap();
        let mut store = InMemoryExecutor::new();

        let report = uow.commit(&mut store, &mut NoopHooks).unwrap();

        assert_eq!(report.batches, 2);
        assert_eq!(store.batch_count(), 2);
        assert_eq!(logged_ids(&store), vec!["Customer#7", "Order#1", "LineItem#1"]);
    }

    // =============================================================================
    // FAILURE PATHS
    // =============================================================================

    #[test]
    fn test_unmapped_relation_fails_build() {
        let catalog = StaticRelationCatalog::new();
        let mut uow = UnitOfWork::new();
        uow.persist("Order#1", EntityType::new("Order")).unwrap();
        uow.persist("Invoice#1", EntityType::new("Invoice")).unwrap();
        uow.link_with_catalog("Order#1", "Invoice#1", RelationKind::OneToOne, &catalog)
            .unwrap();
        let mut store = InMemoryExecutor::new();

        let result = uow.commit(&mut store, &mut NoopHooks);

        assert!(matches!(result, Err(FlushError::MalformedRelation { .. })));
        assert!(store.log().is_empty());
        assert_eq!(uow.registry().len(), 2);
    }

    #[test]
    fn test_detached_target_fails_build() {
        let catalog = shop_catalog();
        let mut uow = shop_unit_of_work(&catalog);
        uow.registry_mut().detach("Customer#7");

        let result = uow.flush_order();

        assert!(matches!(
            result,
            Err(FlushError::DanglingReference { ref target_id, .. }) if target_id.as_str() == "Customer#7"
        ));
    }

    #[test]
    fn test_store_rejection_stops_commit() {
        let catalog = shop_catalog();
        let mut uow = shop_unit_of_work(&catalog);
        let mut store = InMemoryExecutor::new().rejecting("Order#1");

        let result = uow.commit(&mut store, &mut NoopHooks);

        assert!(matches!(
            result,
            Err(FlushError::ExecutionFailed { ref entity_id, .. }) if entity_id.as_str() == "Order#1"
        ));
        assert!(!store.contains("LineItem#1"));
        uow.rollback();
        assert!(uow.registry().is_empty());
    }

    // =============================================================================
    // SERVICE AND CONFIGURATION
    // =============================================================================

    #[test]
    fn test_catalog_loaded_from_json() {
        let mappings: Vec<RelationMapping> = serde_json::from_str(
            r#"[
                {"kind": "ManyToOne", "parent": "Order", "child": "Customer", "owning_side": "Parent"},
                {"kind": "OneToMany", "parent": "Order", "child": "LineItem", "owning_side": "Child"}
            ]"#,
        )
        .unwrap();
        let catalog = StaticRelationCatalog::from_mappings(mappings);
        let mut uow = shop_unit_of_work(&catalog);

        let order = uow.flush_order().unwrap();

        assert!(invariant_dependency_order(&order, uow.registry()));
    }

    #[test]
    fn test_service_enforces_limits_before_traversal() {
        let service = FlushOrderingService::with_config(FlushConfig {
            max_node_count: 3,
            ..Default::default()
        });
        let mut registry = WorkRegistry::new();
        for i in 0..4 {
            let id = format!("Item#{i}");
            registry
                .add_node(id.as_str(), EntityType::new("Item"), LifecycleState::New)
                .unwrap();
            registry.register_head(&id).unwrap();
        }

        let result = service.build_flush_order(&mut registry);

        assert!(matches!(
            result,
            Err(FlushError::TooManyNodes { count: 4, max: 3 })
        ));
    }
}
