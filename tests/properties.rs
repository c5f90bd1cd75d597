use proptest::prelude::*;
use spark_links::{
    flush, link_set, load_links, mount, save_links, use_async_status, use_state_link,
    MemoryStorage, ReadyState, SetAction,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::task::{Poll, Waker};

#[derive(Debug, Clone)]
enum Op {
    Replace(i64),
    Add(i64),
    Scale(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-1000i64..1000).prop_map(Op::Replace),
        (-1000i64..1000).prop_map(Op::Add),
        (-3i64..4).prop_map(Op::Scale),
    ]
}

fn apply(op: &Op, current: i64) -> i64 {
    match op {
        Op::Replace(v) => *v,
        Op::Add(d) => current.wrapping_add(*d),
        Op::Scale(k) => current.wrapping_mul(*k),
    }
}

#[derive(Clone, Default)]
struct Gate {
    open: Rc<Cell<bool>>,
    waker: Rc<RefCell<Option<Waker>>>,
}

impl Gate {
    fn open(&self) {
        self.open.set(true);
        if let Some(waker) = self.waker.borrow_mut().take() {
            waker.wake();
        }
    }

    async fn wait(self) {
        std::future::poll_fn(|cx| {
            if self.open.get() {
                Poll::Ready(())
            } else {
                *self.waker.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        })
        .await
    }
}

proptest! {
    #[test]
    fn prop_initial_value_is_init(v in any::<i64>()) {
        let app = mount(move |cx| use_state_link(cx, v));
        prop_assert_eq!(*app.output().value(), v);
    }

    #[test]
    fn prop_initial_string_is_init(s in ".{0,24}") {
        let init = s.clone();
        let app = mount(move |cx| use_state_link(cx, init.clone()));
        let link = app.output();
        prop_assert_eq!(link.value(), &s);
    }

    #[test]
    fn prop_queued_updates_fold_in_order(
        start in -1000i64..1000,
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let app = mount(move |cx| use_state_link(cx, start));
        let link = app.output();
        for op in ops.clone() {
            match op {
                Op::Replace(v) => link.set(v),
                other => link.set(SetAction::apply(move |n| apply(&other, *n))),
            }
        }
        flush().unwrap();

        let expected = ops.iter().fold(start, |acc, op| apply(op, acc));
        prop_assert_eq!(*app.output().value(), expected);
        prop_assert!(app.render_count() <= 2);
    }

    #[test]
    fn prop_update_some_or_draft(
        items in prop::collection::vec(any::<u8>(), 0..16),
        extra in any::<u8>(),
        replace in any::<bool>(),
    ) {
        let init = items.clone();
        let app = mount(move |cx| use_state_link(cx, init.clone()));
        app.output().update(move |draft| {
            draft.push(extra);
            if replace { Some(vec![extra]) } else { None }
        });
        flush().unwrap();

        let expected = if replace {
            vec![extra]
        } else {
            let mut v = items.clone();
            v.push(extra);
            v
        };
        let link = app.output();
        prop_assert_eq!(link.value(), &expected);
    }

    #[test]
    fn prop_ready_only_after_all_settle(
        order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let gates: Vec<Gate> = (0..order.len()).map(|_| Gate::default()).collect();
        let key = Rc::new(Cell::new(0usize));
        let app = mount({
            let gates = gates.clone();
            let key = key.clone();
            move |cx| {
                let gate = gates[key.get()].clone();
                use_async_status(cx, key.get(), move |_| gate.wait())
            }
        });

        flush().unwrap();
        for next in 1..gates.len() {
            key.set(next);
            app.invalidate();
            flush().unwrap();
        }
        prop_assert_eq!(app.output(), ReadyState::Pending(gates.len() as u32));

        for (resolved, &index) in order.iter().enumerate() {
            prop_assert!(!app.output().is_ready());
            gates[index].open();
            flush().unwrap();
            let outstanding = (gates.len() - resolved - 1) as u32;
            prop_assert_eq!(app.output().outstanding(), outstanding);
        }
        prop_assert!(app.output().is_ready());
    }

    #[test]
    fn prop_persistence_round_trip(
        count in any::<i32>(),
        label in ".{0,16}",
        flags in prop::collection::vec(any::<bool>(), 0..8),
    ) {
        let storage = MemoryStorage::new();
        let source = mount({
            let (count, label, flags) = (count, label.clone(), flags.clone());
            move |cx| {
                let count = use_state_link(cx, count);
                let label = use_state_link(cx, label.clone());
                let flags = use_state_link(cx, flags.clone());
                link_set!(count, label, flags)
            }
        });
        source.with_output(|links| save_links(&storage, "k", links)).unwrap();

        let target = mount(|cx| {
            let count = use_state_link(cx, 0i32);
            let label = use_state_link(cx, String::new());
            let flags = use_state_link(cx, Vec::<bool>::new());
            (count.clone(), label.clone(), flags.clone(), link_set!(count, label, flags))
        });
        let restored = target.with_output(|out| load_links(&storage, "k", &out.3));
        prop_assert!(restored);
        flush().unwrap();

        let (c, l, f, _) = target.output();
        prop_assert_eq!(*c.value(), count);
        prop_assert_eq!(l.value(), &label);
        prop_assert_eq!(f.value(), &flags);
    }
}
