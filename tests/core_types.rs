use locate_image::{
    find_all, to_canonical, CancelToken, LocateError, PixelBuffer, PixelLayout, PixelView,
    RawImage, Rect,
};

#[test]
fn pixel_view_rejects_short_buffers() {
    let data = [0u8; 15];
    let err = PixelView::from_slice(&data, 2, 2).err().unwrap();
    assert!(matches!(
        err,
        LocateError::BufferTooSmall {
            needed: 16,
            got: 15
        }
    ));
}

#[test]
fn pixel_view_rejects_invalid_stride() {
    let data = [0u8; 32];
    let err = PixelView::new(&data, 4, 2, 12).err().unwrap();
    assert!(matches!(
        err,
        LocateError::InvalidStride {
            width: 4,
            stride: 12
        }
    ));
}

#[test]
fn padded_rows_are_ignored() {
    // Two 2-pixel rows with 4 bytes of padding each.
    let mut data = vec![0u8; 24];
    data[0..4].copy_from_slice(&[1, 2, 3, 255]);
    data[12..16].copy_from_slice(&[9, 9, 9, 255]);
    data[8..12].copy_from_slice(&[200, 200, 200, 200]);
    let view = PixelView::new(&data, 2, 2, 12).unwrap();
    assert_eq!(view.pixel(0, 0), Some([1, 2, 3, 255]));
    assert_eq!(view.pixel(0, 1), Some([9, 9, 9, 255]));
    assert_eq!(view.pixel(2, 0), None);
    assert_eq!(view.row(1).map(<[u8]>::len), Some(8));
}

#[test]
fn roi_validates_bounds() {
    let canvas = PixelBuffer::filled(10, 8, [0, 0, 0, 255]).unwrap();
    let err = canvas.view().roi(6, 0, 5, 2).err().unwrap();
    assert!(matches!(
        err,
        LocateError::RoiOutOfBounds {
            x: 6,
            width: 5,
            img_width: 10,
            ..
        }
    ));
    let roi = canvas.view().roi(2, 3, 4, 4).unwrap();
    assert_eq!((roi.width(), roi.height(), roi.origin()), (4, 4, (2, 3)));
}

#[test]
fn searching_an_roi_reports_canvas_coordinates() {
    let red = [255, 0, 0, 255];
    let mut canvas = PixelBuffer::filled(40, 30, [255, 255, 255, 255]).unwrap();
    canvas.fill_rect(Rect::new(3, 3, 4, 4), red);
    canvas.fill_rect(Rect::new(25, 20, 4, 4), red);
    let sample = PixelBuffer::filled(4, 4, red).unwrap();

    let roi = canvas.view().roi(20, 15, 20, 15).unwrap();
    let found = find_all(roi, sample.view(), 0.0, &CancelToken::new()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rect, Rect::new(25, 20, 4, 4));
}

#[test]
fn pixel_buffer_length_must_match() {
    assert!(matches!(
        PixelBuffer::new(vec![0; 15], 2, 2),
        Err(LocateError::BufferTooSmall { .. })
    ));
    assert!(matches!(
        PixelBuffer::new(vec![0; 17], 2, 2),
        Err(LocateError::InvalidDimensions { .. })
    ));
    assert!(PixelBuffer::new(vec![0; 16], 2, 2).is_ok());
}

#[test]
fn crop_copies_the_region() {
    let mut canvas = PixelBuffer::filled(6, 6, [0, 0, 0, 255]).unwrap();
    canvas.put_pixel(2, 3, [7, 8, 9, 255]);
    let crop = canvas.crop(Rect::new(2, 3, 2, 2)).unwrap();
    assert_eq!((crop.width(), crop.height()), (2, 2));
    assert_eq!(crop.view().pixel(0, 0), Some([7, 8, 9, 255]));
    assert_eq!(crop.view().pixel(1, 1), Some([0, 0, 0, 255]));
}

#[test]
fn non_canonical_layouts_must_be_converted() {
    let bgra = [0u8, 0, 255, 255, 0, 255, 0, 255];
    let raw = RawImage::packed(&bgra, 2, 1, PixelLayout::Bgra8);
    assert!(matches!(
        PixelView::from_raw(raw),
        Err(LocateError::UnsupportedFormat {
            layout: PixelLayout::Bgra8
        })
    ));

    let canonical = to_canonical(raw).unwrap();
    assert_eq!(canonical.data(), &[255, 0, 0, 255, 0, 255, 0, 255]);
}

#[test]
fn converted_canvases_are_searchable() {
    // 3x2 RGB canvas with a single blue pixel at (2, 1).
    let mut rgb = vec![10u8; 3 * 2 * 3];
    rgb[15..18].copy_from_slice(&[0, 0, 255]);
    let canvas = to_canonical(RawImage::packed(&rgb, 3, 2, PixelLayout::Rgb8)).unwrap();

    let luma = [0u8];
    let grey_sample = to_canonical(RawImage::packed(&luma, 1, 1, PixelLayout::Luma8)).unwrap();
    let blue_sample = PixelBuffer::filled(1, 1, [0, 0, 255, 0]).unwrap();

    let cancel = CancelToken::new();
    let blue = find_all(canvas.view(), blue_sample.view(), 0.0, &cancel).unwrap();
    assert_eq!(blue.len(), 1);
    assert_eq!(blue[0].rect, Rect::new(2, 1, 1, 1));

    let grey = find_all(canvas.view(), grey_sample.view(), 0.0, &cancel).unwrap();
    assert!(grey.is_empty());
}

#[test]
fn alpha_is_ignored_when_comparing() {
    let canvas = PixelBuffer::filled(3, 3, [40, 50, 60, 0]).unwrap();
    let sample = PixelBuffer::filled(2, 2, [40, 50, 60, 255]).unwrap();
    let found = find_all(canvas.view(), sample.view(), 0.0, &CancelToken::new()).unwrap();
    assert_eq!(found.len(), 4);
    assert!(found.iter().all(|m| m.similarity == 1.0));
}
