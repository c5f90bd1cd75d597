use spark_links::{
    flush, mount, pending_update_count, use_mount_tracker, use_safe_link, use_state_link,
    SetAction,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn test_component_drop_runs_cleanups() {
    let cleanup_called = Rc::new(Cell::new(false));

    {
        let _app = mount({
            let cleanup_called = cleanup_called.clone();
            move |cx| {
                let flag = cleanup_called.clone();
                cx.use_effect_with_cleanup((), move |_| {
                    Some(Box::new(move || flag.set(true)))
                });
            }
        });
        flush().unwrap();
        assert!(!cleanup_called.get());
        // _app drops here
    }

    assert!(cleanup_called.get(), "Dropping the last handle should tear down");
}

#[test]
fn test_mount_tracker_flips_once_on_drop() {
    let handle = {
        let app = mount(|cx| use_mount_tracker(cx));
        let handle = app.output();
        assert!(handle.is_mounted());
        handle
    };
    assert!(!handle.is_mounted());
}

#[test]
fn test_dropped_component_never_renders_again() {
    let renders = Rc::new(Cell::new(0));
    let link = {
        let app = mount({
            let renders = renders.clone();
            move |cx| {
                renders.set(renders.get() + 1);
                use_state_link(cx, 0)
            }
        });
        app.output()
    };

    link.set(1);
    flush().unwrap();
    assert_eq!(renders.get(), 1);
}

#[test]
fn test_safe_link_after_drop_is_silent() {
    let evaluated = Rc::new(Cell::new(false));
    let link = {
        let app = mount(|cx| use_safe_link(cx, 5));
        app.output()
    };

    let before = pending_update_count();
    let flag = evaluated.clone();
    link.set(SetAction::apply(move |n| {
        flag.set(true);
        n + 1
    }));
    link.update(|n| {
        *n = 0;
        None
    });

    assert!(!evaluated.get());
    assert_eq!(pending_update_count(), before);
}

#[test]
fn test_teardown_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let app = mount({
        let log = log.clone();
        move |cx| {
            let first = log.clone();
            cx.use_effect_with_cleanup(1, move |_| {
                Some(Box::new(move || first.borrow_mut().push("effect 1")))
            });
            let second = log.clone();
            cx.use_effect_with_cleanup(2, move |_| {
                Some(Box::new(move || second.borrow_mut().push("effect 2")))
            });
            let unmount = log.clone();
            cx.on_unmount(move || unmount.borrow_mut().push("unmount"));
        }
    });
    flush().unwrap();
    app.unmount();

    assert_eq!(*log.borrow(), vec!["effect 2", "effect 1", "unmount"]);
}

#[test]
fn test_queued_writes_released_on_drop() {
    let before = pending_update_count();
    {
        let app = mount(|cx| use_state_link(cx, 0));
        let link = app.output();
        link.set(1);
        link.set(2);
        assert_eq!(pending_update_count(), before + 2);
    }
    assert_eq!(pending_update_count(), before);
}
