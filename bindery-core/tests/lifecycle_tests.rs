use std::cell::RefCell as StdRefCell;
use std::rc::Rc;

use bindery_core::Lifecycle;

#[test]
fn test_mounted_and_destroy_hooks() {
    let lifecycle = Lifecycle::new();
    let v1 = Rc::new(StdRefCell::new(0));
    let v2 = Rc::new(StdRefCell::new(0));

    {
        let v1_clone = v1.clone();
        lifecycle.on_mounted(move || {
            *v1_clone.borrow_mut() = 1;
        });
    }
    {
        let v2_clone = v2.clone();
        lifecycle.before_destroy(move || {
            *v2_clone.borrow_mut() = 2;
        });
    }

    lifecycle.run_mounted_hooks();
    lifecycle.run_destroy_hooks();

    assert_eq!(*v1.borrow(), 1);
    assert_eq!(*v2.borrow(), 2);
}

#[test]
fn hooks_run_once() {
    let lifecycle = Lifecycle::new();
    let count = Rc::new(StdRefCell::new(0));
    {
        let count = count.clone();
        lifecycle.on_mounted(move || *count.borrow_mut() += 1);
    }
    lifecycle.run_mounted_hooks();
    lifecycle.run_mounted_hooks();
    assert_eq!(*count.borrow(), 1);
}
