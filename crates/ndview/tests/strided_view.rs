use ndview::{
    tensor::layout, LayoutType, SliceSpec, StridedLayout, StridedSource, StridedSourceMut,
    Tensor, TensorError, TensorView, ViewError,
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn arange(shape: &[usize]) -> Result<Tensor<i32>, TensorError> {
    let numel = shape.iter().product();
    Tensor::arange(numel)?.reshape(shape)
}

fn random_permutation(rng: &mut StdRng, rank: usize) -> Vec<usize> {
    let mut axes: Vec<usize> = (0..rank).collect();
    axes.shuffle(rng);
    axes
}

#[test]
fn transpose_assignment() -> Result<(), TensorError> {
    init_logger();
    let mut e = arange(&[2, 2, 6])?;

    {
        let vt = e.transpose();
        assert_eq!(vt.shape(), &[6, 2, 2]);
        assert_eq!(vt[[0, 0, 1]], 12);
        assert_eq!(vt[[5, 1, 1]], 23);
    }

    e.transpose_mut()[[0, 0, 1]] = 123;
    assert_eq!(e[[1, 0, 0]], 123);

    let vt = e.transpose();
    let err = vt.get(&[10, 10, 10]).unwrap_err();
    assert!(err.is_bounds_error());
    assert_eq!(err, TensorError::index_out_of_bounds(0, 10, 6));
    assert!(vt.get(&[0, 0]).unwrap_err().is_usage_error());
    Ok(())
}

#[test]
fn transpose_element_mapping() -> Result<(), TensorError> {
    let e = arange(&[3, 4, 5])?;
    let vt = e.transpose();
    for i in 0..3 {
        for j in 0..4 {
            for k in 0..5 {
                assert_eq!(vt[[k, j, i]], e[[i, j, k]]);
            }
        }
    }
    Ok(())
}

#[test]
fn transpose_layout_swap() -> Result<(), TensorError> {
    let a = arange(&[5, 5])?;
    let at = a.transpose();
    assert_eq!(at.layout(), LayoutType::ColumnMajor);
    let att = at.transpose();
    assert_eq!(att.layout(), LayoutType::RowMajor);

    let data: Vec<i32> = (0..125).collect();
    let c = Tensor::from_shape_vec_with_layout(&[5, 5, 5], data, LayoutType::ColumnMajor)?;
    assert_eq!(c.permute(&[0, 1, 2])?.layout(), LayoutType::ColumnMajor);
    assert_eq!(c.permute(&[2, 1, 0])?.layout(), LayoutType::RowMajor);
    assert_eq!(c.permute(&[2, 0, 1])?.layout(), LayoutType::Dynamic);
    Ok(())
}

#[test]
fn transpose_is_involution() -> Result<(), TensorError> {
    for shape in [&[4][..], &[2, 3], &[2, 1, 3], &[3, 0, 2], &[2, 3, 4, 5]] {
        let t = arange(shape)?;
        let once = t.view();
        let twice = t.transpose().transpose();
        assert_eq!(twice.strided_layout(), once.strided_layout());
    }
    Ok(())
}

#[test]
fn permute_composition() -> Result<(), TensorError> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..32 {
        let rank = rng.random_range(1..=5);
        let shape: Vec<usize> = (0..rank).map(|_| rng.random_range(1..=4)).collect();
        let t = arange(&shape)?;
        let p = random_permutation(&mut rng, rank);
        let q = random_permutation(&mut rng, rank);

        let twice = t.permute(&p)?.permute(&q)?;
        let once = t.permute(&layout::compose_permutations(&p, &q))?;
        assert_eq!(twice.strided_layout(), once.strided_layout());
        assert_eq!(twice.to_tensor(), once.to_tensor());
    }
    Ok(())
}

#[test]
fn permute_composition_on_unit_axes() -> Result<(), TensorError> {
    let t = arange(&[4, 1, 1])?;
    let p = [1, 0, 2];
    let q = [2, 1, 0];
    let twice = t.permute(&p)?.permute(&q)?;
    let once = t.permute(&layout::compose_permutations(&p, &q))?;
    assert_eq!(twice.strided_layout(), once.strided_layout());
    assert_eq!(twice.layout(), LayoutType::RowMajor);

    let data = vec![0, 1, 2, 3];
    let column = Tensor::from_shape_vec_with_layout(&[1, 4], data, LayoutType::ColumnMajor)?;
    assert_eq!(column.view().layout(), LayoutType::RowMajor);
    assert_eq!(column.transpose().layout(), LayoutType::RowMajor);
    assert_eq!(
        column.transpose().transpose().strided_layout(),
        column.view().strided_layout()
    );
    Ok(())
}

#[test]
fn permute_rejects_invalid_axes() -> Result<(), TensorError> {
    let t = arange(&[2, 3, 4])?;
    assert!(matches!(
        t.permute(&[0, 0, 1]),
        Err(TensorError::InvalidPermutation { .. })
    ));
    assert!(matches!(
        t.permute(&[0, 1, 3]),
        Err(TensorError::InvalidPermutation { .. })
    ));
    assert!(matches!(
        t.permute(&[1, 0]),
        Err(TensorError::RankMismatch { .. })
    ));
    Ok(())
}

#[test]
fn layout_tag_is_truthful() -> Result<(), ViewError> {
    let mut rng = StdRng::seed_from_u64(7);
    let t = arange(&[4, 3, 5])?;
    for _ in 0..64 {
        let p = random_permutation(&mut rng, 3);
        let start = rng.random_range(0..2);
        let step = if rng.random_bool(0.5) { 1 } else { -1 };
        let v = t.permute(&p)?.slice(&[SliceSpec::Range {
            start: if step > 0 { Some(start) } else { None },
            stop: None,
            step,
        }])?;
        let strides_match = |order| layout::matches_layout(v.shape(), v.strides(), order);
        match v.layout() {
            LayoutType::RowMajor => assert!(strides_match(LayoutType::RowMajor)),
            LayoutType::ColumnMajor => assert!(strides_match(LayoutType::ColumnMajor)),
            LayoutType::Dynamic => {}
            LayoutType::Any => panic!("views never report Any"),
        }
    }
    Ok(())
}

#[test]
fn dynamic_view_range() -> Result<(), ViewError> {
    let e = arange(&[24])?;
    let v = e.slice(&[SliceSpec::range(2, 10, 3)])?;
    assert_eq!(v.shape(), &[3]);
    assert_eq!(v[[0]], 2);
    assert_eq!(v[[1]], 5);
    assert_eq!(v[[2]], 8);
    Ok(())
}

#[test]
fn dynamic_view_mixed_entries() -> Result<(), ViewError> {
    let e = arange(&[3, 4, 5])?;
    let v = e.slice(&ndview::s![1, SliceSpec::NewAxis, SliceSpec::step(-1), 1..5])?;
    assert_eq!(v.shape(), &[1, 4, 4]);
    for j in 0..4 {
        for k in 0..4 {
            assert_eq!(v[[0, j, k]], e[[1, 3 - j, k + 1]]);
        }
    }
    Ok(())
}

#[test]
fn dynamic_view_errors() -> Result<(), TensorError> {
    let e = arange(&[3, 4])?;
    assert_eq!(
        e.slice(&[SliceSpec::All, SliceSpec::All, SliceSpec::All])
            .unwrap_err(),
        ViewError::TooManySlices { count: 3, rank: 2 }
    );
    assert_eq!(
        e.slice(&[SliceSpec::step(0)]).unwrap_err(),
        ViewError::ZeroStep { axis: 0 }
    );
    let err = e.slice(&[SliceSpec::All, SliceSpec::Index(4)]).unwrap_err();
    assert_eq!(
        err,
        ViewError::SliceOutOfBounds {
            axis: 1,
            index: 4,
            size: 4
        }
    );
    assert!(err.is_usage_error());
    Ok(())
}

#[test]
fn empty_views() -> Result<(), ViewError> {
    let e = arange(&[3, 4])?;
    let v = e.slice(&[SliceSpec::range(2, 2, 1)])?;
    assert_eq!(v.shape(), &[0, 4]);
    assert_eq!(v.offset(), 0);
    assert!(v.is_empty());
    assert_eq!(v.to_tensor().numel(), 0);
    assert!(v.clone().flatten().is_empty());
    assert!(v.transpose().is_empty());
    Ok(())
}

#[test]
fn views_observe_source_writes() -> Result<(), TensorError> {
    let mut e = arange(&[2, 3])?;
    e[[1, 2]] = -1;
    let v = e.transpose();
    assert_eq!(v[[2, 1]], -1);
    Ok(())
}

#[test]
fn explicit_views_over_buffers() -> Result<(), ViewError> {
    let data: Vec<i32> = (0..12).collect();
    let v = TensorView::new(&data, &[3, 2], &[-4, 2], 9)?;
    assert_eq!(v.layout(), LayoutType::Dynamic);
    assert_eq!(v.to_tensor().as_slice(), &[9, 11, 5, 7, 1, 3]);
    assert!(matches!(
        TensorView::new(&data, &[3, 2], &[-4, 2], 7),
        Err(ViewError::BufferOverrun { .. })
    ));
    let layout = StridedLayout::new(&[3, 2], &[-4, 2], 9)?;
    assert_eq!(v.strided_layout(), &layout);
    Ok(())
}

#[test]
fn ravel_orders() -> Result<(), TensorError> {
    init_logger();
    let a = arange(&[2, 3])?;

    let row = a.ravel(LayoutType::RowMajor)?;
    assert!(row.is_view());
    assert_eq!(row.to_vec(), vec![0, 1, 2, 3, 4, 5]);

    let col = a.ravel(LayoutType::ColumnMajor)?;
    assert!(!col.is_view());
    assert_eq!(col.to_vec(), vec![0, 3, 1, 4, 2, 5]);

    assert_eq!(a.flatten(), row);
    assert_eq!(a.ravel(LayoutType::Any)?, row);
    assert_eq!(
        a.ravel(LayoutType::Dynamic).unwrap_err(),
        TensorError::InvalidLayout(LayoutType::Dynamic)
    );
    Ok(())
}

#[test]
fn ravel_transposed_is_zero_copy_column_major() -> Result<(), TensorError> {
    let a = arange(&[3, 4])?;
    let t = a.transpose();
    let r = t.clone().ravel(LayoutType::ColumnMajor)?;
    assert!(r.is_view());
    assert_eq!(r.to_vec(), a.flatten().to_vec());
    let r = t.ravel(LayoutType::RowMajor)?;
    assert!(!r.is_view());
    assert_eq!(r.to_vec(), vec![0, 4, 8, 1, 5, 9, 2, 6, 10, 3, 7, 11]);
    Ok(())
}

#[test]
fn ravel_reversed_slice_copies_in_order() -> Result<(), ViewError> {
    init_logger();
    let a = arange(&[2, 3])?;
    let v = a.slice(&[SliceSpec::step(-1), SliceSpec::step(-1)])?;
    assert_eq!(v.strides(), &[-3, -1]);
    assert_eq!(v.offset(), 5);

    let row = v.clone().ravel(LayoutType::RowMajor)?;
    assert!(!row.is_view());
    assert_eq!(row.to_vec(), vec![5, 4, 3, 2, 1, 0]);

    let col = v.clone().ravel(LayoutType::ColumnMajor)?;
    assert!(!col.is_view());
    assert_eq!(col.to_vec(), vec![5, 2, 4, 1, 3, 0]);

    assert_eq!(v.flatten(), row);
    Ok(())
}

#[test]
fn fill_and_assign_through_views() -> Result<(), ViewError> {
    let mut t = Tensor::<i32>::zeros(&[4, 4]);
    t.slice_mut(&[SliceSpec::step(2), SliceSpec::step(2)])?.fill(1);
    assert_eq!(
        t.as_slice(),
        &[1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0]
    );

    let src = arange(&[4])?;
    t.slice_mut(&[SliceSpec::All, SliceSpec::Index(3)])?
        .assign(&src)?;
    assert_eq!(t.slice(&[SliceSpec::All, SliceSpec::Index(3)])?.to_tensor(), src);
    Ok(())
}
